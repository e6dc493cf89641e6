use std::fmt;
use std::io;

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Bracket {
    Open,
    Close,
}

impl Bracket {
    pub fn as_char(self) -> char {
        match self {
            Bracket::Open => '[',
            Bracket::Close => ']',
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Unbalanced brackets. `position` indexes the cleaned source, i.e. the
/// operator characters left after comments are stripped.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("unmatched '{bracket}' at position {position}")]
pub struct BracketMismatchError {
    pub position: usize,
    pub bracket: Bracket,
}

/// The data pointer was about to leave the tape.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("index out of range: instruction {ip} addressed cell {target}")]
pub struct OutOfRangeError {
    pub ip: usize,
    pub target: isize,
}

#[derive(Debug, Error)]
pub enum VmError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),
    #[error("stream error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("compile error: {0}")]
    Compile(#[from] BracketMismatchError),
    #[error("runtime error: {0}")]
    Run(#[from] VmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = BracketMismatchError {
            position: 4,
            bracket: Bracket::Close,
        };
        assert_eq!(err.to_string(), "unmatched ']' at position 4");

        let err: Error = VmError::from(OutOfRangeError { ip: 2, target: -1 }).into();
        assert_eq!(
            err.to_string(),
            "runtime error: index out of range: instruction 2 addressed cell -1"
        );
    }
}
