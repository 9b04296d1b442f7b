use std::io::BufRead;
use std::str::FromStr;

use tracing::debug;

use crate::error::{LinkStateError, LinkStateResult};
use crate::token::{Token, Tokenizer};

/// A dense N×N adjacency matrix of edge weights.
///
/// Entries are stored row-major: `edges[i * n + j]` is the weight of the
/// edge i→j.  `None` means there is no such edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    n: usize,
    edges: Vec<Option<u32>>,
}

impl Matrix {
    /// Parse a matrix from a buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> LinkStateResult<Self> {
        MatrixBuilder::new(reader).build()
    }

    /// Build a matrix directly from rows.  Panics if the rows are not square.
    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<Option<u32>>>) -> Self {
        let n = rows.len();
        assert!(rows.iter().all(|r| r.len() == n), "rows must be square");
        Matrix {
            n,
            edges: rows.into_iter().flatten().collect(),
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn weight(&self, from: usize, to: usize) -> Option<u32> {
        self.edges[from * self.n + to]
    }

    /// Outgoing edge weights of node `i`.
    #[cfg(test)]
    pub fn row(&self, i: usize) -> &[Option<u32>] {
        &self.edges[i * self.n..(i + 1) * self.n]
    }
}

impl FromStr for Matrix {
    type Err = LinkStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

/// Consumes a token stream and validates it into a square [`Matrix`].
///
/// Values are accumulated in a growable buffer because the width is not
/// known until the first row terminator; once the shape is validated the
/// buffer is trimmed to exactly N² entries and becomes the matrix.
pub struct MatrixBuilder<R> {
    tokens: Tokenizer<R>,
    values: Vec<Option<u32>>,
    width: Option<usize>,
    row_len: usize,
    rows: usize,
}

impl<R: BufRead> MatrixBuilder<R> {
    pub fn new(reader: R) -> Self {
        MatrixBuilder {
            tokens: Tokenizer::new(reader),
            values: Vec::new(),
            width: None,
            row_len: 0,
            rows: 0,
        }
    }

    pub fn build(mut self) -> LinkStateResult<Matrix> {
        loop {
            match self.tokens.next_token() {
                Token::Number(weight) => self.push(Some(weight))?,
                Token::Infinity => self.push(None)?,
                Token::Comma => {}
                Token::RowEnd => self.close_row()?,
                Token::EndOfInput => break,
                Token::Error(reason) => return Err(LinkStateError::InvalidInput { reason }),
            }
        }
        self.finish()
    }

    fn push(&mut self, value: Option<u32>) -> LinkStateResult<()> {
        if self.values.try_reserve(1).is_err() {
            return Err(LinkStateError::OutOfMemory {
                n: self.width.unwrap_or(self.row_len + 1),
            });
        }
        self.values.push(value);
        self.row_len += 1;
        Ok(())
    }

    fn close_row(&mut self) -> LinkStateResult<()> {
        match self.width {
            None if self.row_len == 0 => return Err(LinkStateError::ZeroElements),
            None => {
                debug!(n = self.row_len, "matrix width fixed by first row");
                self.width = Some(self.row_len);
            }
            Some(expected) if self.row_len != expected => {
                return Err(LinkStateError::RowLength {
                    row: self.rows + 1,
                    found: self.row_len,
                    expected,
                });
            }
            Some(_) => {}
        }
        self.rows += 1;
        self.row_len = 0;
        Ok(())
    }

    fn finish(self) -> LinkStateResult<Matrix> {
        if self.row_len > 0 {
            return Err(LinkStateError::UnterminatedRow {
                row: self.rows + 1,
                found: self.row_len,
            });
        }

        let n = self.width.ok_or(LinkStateError::ZeroElements)?;
        if self.rows != n {
            return Err(LinkStateError::RowCount {
                found: self.rows,
                expected: n,
            });
        }

        // n rows of n values each
        let mut edges = self.values;
        edges.shrink_to_fit();

        debug!(n, "matrix complete");
        Ok(Matrix { n, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::token::LexError;

    fn parse(input: &str) -> LinkStateResult<Matrix> {
        input.parse()
    }

    #[test]
    fn parse_three_by_three() {
        let m = parse("0,3,N.\nN,0,1.\n2,N,0.\nEOF.").unwrap();
        assert_eq!(m.size(), 3);
        assert_eq!(m.row(0), &[Some(0), Some(3), None]);
        assert_eq!(m.row(1), &[None, Some(0), Some(1)]);
        assert_eq!(m.weight(2, 0), Some(2));
        assert_eq!(m.weight(2, 1), None);
    }

    #[test]
    fn buffer_holds_exactly_n_squared_entries() {
        let m = parse("0,1,2.\n3,0,4.\n5,6,0.\n").unwrap();
        assert_eq!(m.edges.len(), 9);
        assert_eq!(m.edges[5], Some(4));
    }

    #[test]
    fn physical_end_of_stream_is_accepted() {
        let m = parse("0,1.\n1,0.\n").unwrap();
        assert_eq!(m, Matrix::from_rows(vec![vec![Some(0), Some(1)], vec![Some(1), Some(0)]]));
    }

    #[test]
    fn single_node() {
        let m = parse("0.EOF.").unwrap();
        assert_eq!(m.size(), 1);
        assert_eq!(m.weight(0, 0), Some(0));
    }

    #[test]
    fn commas_are_pure_separators() {
        let m = parse("0 5,,N.\n5,0,N.\nN N 0.").unwrap();
        assert_eq!(m.row(0), &[Some(0), Some(5), None]);
        assert_eq!(m.row(2), &[None, None, Some(0)]);
    }

    #[test]
    fn content_after_end_marker_is_ignored() {
        let m = parse("0.\nEOF.\ngarbage").unwrap();
        assert_eq!(m.size(), 1);
    }

    #[test]
    fn second_row_length_mismatch() {
        let err = parse("0,1,2.\n1,0.\n2,1,0.\nEOF.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentCount);
        assert!(matches!(
            err,
            LinkStateError::RowLength {
                row: 2,
                found: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn empty_first_row() {
        let err = parse(".\n0.\nEOF.").unwrap_err();
        assert!(matches!(err, LinkStateError::ZeroElements));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn empty_input() {
        assert!(matches!(parse("").unwrap_err(), LinkStateError::ZeroElements));
        assert!(matches!(parse("EOF.").unwrap_err(), LinkStateError::ZeroElements));
    }

    #[test]
    fn too_few_rows() {
        let err = parse("0,1.\nEOF.").unwrap_err();
        assert!(matches!(
            err,
            LinkStateError::RowCount {
                found: 1,
                expected: 2
            }
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn too_many_rows() {
        let err = parse("0.\n1.\n").unwrap_err();
        assert!(matches!(
            err,
            LinkStateError::RowCount {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn unterminated_last_row() {
        let err = parse("0,1.\n1,0").unwrap_err();
        assert!(matches!(
            err,
            LinkStateError::UnterminatedRow { row: 2, found: 2 }
        ));
        assert_eq!(err.kind(), ErrorKind::InconsistentCount);
    }

    #[test]
    fn invalid_token() {
        let err = parse("0,1.\n1;0.\n").unwrap_err();
        assert_eq!(err.exit_code(), 6);
        match err {
            LinkStateError::InvalidInput {
                reason: LexError::Unexpected { ch, at },
            } => {
                assert_eq!(ch, ';');
                assert_eq!((at.line, at.column), (2, 2));
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_weight_is_invalid_input() {
        let err = parse("0,99999999999.\n0,0.\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
