//! Error types for timeword operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Empty input")]
    Empty,

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Ambiguous units: {0}")]
    AmbiguousUnits(String),

    #[error("No match: {0}")]
    NoMatch(String),

    #[error("Negative value not allowed: {0}")]
    NegativeNotAllowed(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
