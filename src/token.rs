use std::fmt;
use std::io::{self, BufRead};

use thiserror::Error;
use tracing::trace;

/// The literal that ends the input before the physical end of the stream.
const END_MARKER: &[u8] = b"EOF.";

/// 1-based line and column of a byte in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position { line: 1, column: 1 }
    }

    fn advance(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Why the tokenizer could not produce a token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character {ch:?}")]
    Unexpected { ch: char, at: Position },

    #[error("input ended inside the EOF. marker")]
    UnexpectedEnd { at: Position },

    #[error("weight {digits} exceeds the maximum of {}", u32::MAX)]
    Overflow { digits: String, at: Position },

    #[error("read failed: {message}")]
    Io { message: String, at: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::Unexpected { at, .. }
            | LexError::UnexpectedEnd { at }
            | LexError::Overflow { at, .. }
            | LexError::Io { at, .. } => *at,
        }
    }
}

/// A lexical unit of the adjacency matrix notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A non-negative edge weight.
    Number(u32),
    Comma,
    /// `.` terminates a matrix row.
    RowEnd,
    /// `N`: no edge.
    Infinity,
    /// Either the `EOF.` marker or the physical end of the stream.
    EndOfInput,
    Error(LexError),
}

/// Pulls tokens one at a time from a buffered byte stream.
///
/// Once the stream is exhausted (or the `EOF.` marker has been read) every
/// further call to [`Tokenizer::next_token`] returns [`Token::EndOfInput`].
/// After a [`Token::Error`] the caller must stop.
pub struct Tokenizer<R> {
    reader: R,
    pos: Position,
    finished: bool,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Tokenizer {
            reader,
            pos: Position::start(),
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::EndOfInput;
        }

        let token = self.lex().unwrap_or_else(Token::Error);
        trace!(?token, at = %self.pos, "token");
        token
    }

    fn lex(&mut self) -> Result<Token, LexError> {
        let byte = loop {
            match self.peek()? {
                None => {
                    self.finished = true;
                    return Ok(Token::EndOfInput);
                }
                Some(b @ (b' ' | b'\t' | b'\n' | b'\r')) => self.bump(b),
                Some(b) => break b,
            }
        };

        let start = self.pos;
        match byte {
            b'0'..=b'9' => self.number(start),
            b',' => {
                self.bump(byte);
                Ok(Token::Comma)
            }
            b'.' => {
                self.bump(byte);
                Ok(Token::RowEnd)
            }
            b'N' => {
                self.bump(byte);
                match self.peek()? {
                    Some(next) if next.is_ascii_alphabetic() => Err(LexError::Unexpected {
                        ch: char::from(next),
                        at: self.pos,
                    }),
                    _ => Ok(Token::Infinity),
                }
            }
            b'E' => self.end_marker(),
            other => Err(LexError::Unexpected {
                ch: char::from(other),
                at: start,
            }),
        }
    }

    /// Maximal run of digits.  The whole run is consumed even when it
    /// overflows, so the error covers the full literal.
    fn number(&mut self, start: Position) -> Result<Token, LexError> {
        let mut digits = String::new();
        let mut value: Option<u32> = Some(0);

        while let Some(b @ b'0'..=b'9') = self.peek()? {
            self.bump(b);
            digits.push(char::from(b));
            value = value
                .and_then(|v| v.checked_mul(10))
                .and_then(|v| v.checked_add(u32::from(b - b'0')));
        }

        match value {
            Some(v) => Ok(Token::Number(v)),
            None => Err(LexError::Overflow { digits, at: start }),
        }
    }

    fn end_marker(&mut self) -> Result<Token, LexError> {
        for &expected in END_MARKER {
            match self.peek()? {
                Some(b) if b == expected => self.bump(b),
                Some(b) => {
                    return Err(LexError::Unexpected {
                        ch: char::from(b),
                        at: self.pos,
                    })
                }
                None => return Err(LexError::UnexpectedEnd { at: self.pos }),
            }
        }
        self.finished = true;
        Ok(Token::EndOfInput)
    }

    fn peek(&mut self) -> Result<Option<u8>, LexError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(LexError::Io {
                        message: e.to_string(),
                        at: self.pos,
                    })
                }
            }
        }
    }

    fn bump(&mut self, byte: u8) {
        self.reader.consume(1);
        self.pos.advance(byte);
    }
}
