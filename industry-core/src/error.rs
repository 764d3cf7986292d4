//! Error types for industry-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Binary format error: {0}")]
    BinRw(String),

    #[error("Truncated input: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Character {ch:?} at position {index} is outside the encodable range 0-255")]
    EncodingRange { ch: char, index: usize },

    #[error("Malformed string at offset {offset}: odd encoded length {len}")]
    MalformedString { offset: usize, len: usize },

    #[error("Invalid {field} {count} at offset {offset}")]
    InvalidCount {
        offset: usize,
        field: &'static str,
        count: i32,
    },

    #[error("{what} index {index} out of range (have {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Car type table error: {0}")]
    CarTypes(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<binrw::Error> for Error {
    fn from(e: binrw::Error) -> Self {
        Error::BinRw(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::CarTypes(e.to_string())
    }
}
