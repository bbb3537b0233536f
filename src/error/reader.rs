use crate::TokenKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReaderError {
    ExpectedToken {
        reason: &'static str,
        expected: Option<TokenKind>,
        received: Option<TokenKind>,
        slice: String,
    },
    UnknownForm(String),
    BadToken(String),
    EarlyEof,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::ExpectedToken {
                reason,
                expected,
                received,
                slice,
            } => write!(
                f,
                "{} (expected {:?}; got {:?} `{}`)",
                reason, expected, received, slice
            ),
            ReaderError::UnknownForm(form) => write!(f, "unknown form `{}`", form),
            ReaderError::BadToken(slice) => write!(f, "unexpected input `{}`", slice),
            ReaderError::EarlyEof => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for ReaderError {}

pub type ReaderResult<O = ()> = Result<O, ReaderError>;
