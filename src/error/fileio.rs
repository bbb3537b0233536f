use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FileIOError {
    Encode(String),
    MalformedHeader(MalformedHeaderError),
    MalformedPayload(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MalformedHeaderError {
    ImageDecl,
    Version,
}

impl fmt::Display for FileIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileIOError::Encode(why) => write!(f, "could not encode image: {}", why),
            FileIOError::MalformedHeader(which) => write!(f, "malformed image header ({:?})", which),
            FileIOError::MalformedPayload(why) => write!(f, "malformed image payload: {}", why),
        }
    }
}

impl std::error::Error for FileIOError {}

pub type FileIOResult<O = ()> = Result<O, FileIOError>;
