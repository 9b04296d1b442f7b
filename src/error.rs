use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::token::{LexError, Position};

/// Coarse failure categories, one per process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Io,
    OutOfMemory,
    ZeroElements,
    InconsistentCount,
    InvalidInput,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Usage => 1,
            ErrorKind::Io => 2,
            ErrorKind::OutOfMemory => 3,
            ErrorKind::InconsistentCount => 4,
            ErrorKind::ZeroElements => 5,
            ErrorKind::InvalidInput => 6,
        }
    }
}

/// Every way a run can fail.  All of them are fatal.
#[derive(Error, Debug)]
pub enum LinkStateError {
    #[error("Usage: linkstate FILE")]
    Usage,

    #[error("IO Error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the trace to stdout failed.
    #[error("IO Error: {0}")]
    Output(#[from] io::Error),

    #[error("out of memory: cannot allocate a {n}x{n} matrix")]
    OutOfMemory { n: usize },

    #[error("first row has zero elements")]
    ZeroElements,

    #[error("row {row} has {found} elements, expected {expected}")]
    RowLength {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("matrix has {found} rows, expected {expected}")]
    RowCount { found: usize, expected: usize },

    #[error("row {row} has {found} elements but no '.' terminator")]
    UnterminatedRow { row: usize, found: usize },

    #[error("invalid input at {}: {reason}", .reason.position())]
    InvalidInput { reason: LexError },
}

impl LinkStateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkStateError::Usage => ErrorKind::Usage,
            LinkStateError::Io { .. } | LinkStateError::Output(_) => ErrorKind::Io,
            LinkStateError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            LinkStateError::ZeroElements => ErrorKind::ZeroElements,
            LinkStateError::RowLength { .. }
            | LinkStateError::RowCount { .. }
            | LinkStateError::UnterminatedRow { .. } => ErrorKind::InconsistentCount,
            LinkStateError::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    /// Where in the input the error was detected, if it is tied to a token.
    pub fn position(&self) -> Option<Position> {
        match self {
            LinkStateError::InvalidInput { reason } => Some(reason.position()),
            _ => None,
        }
    }
}

pub type LinkStateResult<T> = Result<T, LinkStateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::Usage,
            ErrorKind::Io,
            ErrorKind::OutOfMemory,
            ErrorKind::InconsistentCount,
            ErrorKind::ZeroElements,
            ErrorKind::InvalidInput,
        ];
        let codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn row_errors_share_inconsistent_count() {
        let length = LinkStateError::RowLength {
            row: 2,
            found: 2,
            expected: 3,
        };
        let count = LinkStateError::RowCount {
            found: 2,
            expected: 3,
        };
        assert_eq!(length.kind(), ErrorKind::InconsistentCount);
        assert_eq!(count.exit_code(), 4);
        assert_eq!(length.to_string(), "row 2 has 2 elements, expected 3");
    }

    #[test]
    fn io_error_mentions_path_and_cause() {
        let err = LinkStateError::Io {
            path: PathBuf::from("graph.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "IO Error: graph.txt: No such file or directory"
        );
    }

    #[test]
    fn invalid_input_reports_position() {
        let err = LinkStateError::InvalidInput {
            reason: LexError::Unexpected {
                ch: 'x',
                at: Position { line: 2, column: 5 },
            },
        };
        assert_eq!(err.position(), Some(Position { line: 2, column: 5 }));
        assert_eq!(err.exit_code(), 6);
        assert_eq!(
            err.to_string(),
            "invalid input at 2:5: unexpected character 'x'"
        );
    }
}
