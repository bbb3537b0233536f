use std::fmt;

pub mod config;
pub mod fileio;
pub mod reader;
pub mod runtime;

pub use config::*;
pub use fileio::*;
pub use reader::*;
pub use runtime::*;

/// Any failure between reading a program and running it to completion
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Reader(ReaderError),
    Config(ConfigError),
    Runtime(RuntimeError),
    FileIO(FileIOError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Reader(e) => write!(f, "read error: {}", e),
            Error::Config(e) => write!(f, "configuration error: {}", e),
            Error::Runtime(e) => write!(f, "runtime error: {}", e),
            Error::FileIO(e) => write!(f, "image error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! from_error {
    ($($variant:ident($ty:ty)),*) => {
        $(impl From<$ty> for Error {
            fn from(e: $ty) -> Self {
                Error::$variant(e)
            }
        })*
    };
}

from_error!(
    Reader(ReaderError),
    Config(ConfigError),
    Runtime(RuntimeError),
    FileIO(FileIOError)
);

pub type Result<O = ()> = std::result::Result<O, Error>;
