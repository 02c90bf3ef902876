//! Error types for uncooked

use thiserror::Error;

/// Main error type for uncooked operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("read out of range: offset {offset} + {len} exceeds buffer of {size} bytes")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("truncated input: {expected} bytes required but only {available} remain")]
    TruncatedInput { expected: usize, available: usize },

    #[error("malformed delimited row {row}: expected {expected} columns, found {found}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("string of {len} bytes exceeds field capacity of {capacity}")]
    StringTooLong { len: usize, capacity: usize },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("cache error: {0}")]
    Cache(String),
}

/// Result type alias for uncooked operations
pub type Result<T> = std::result::Result<T, Error>;
