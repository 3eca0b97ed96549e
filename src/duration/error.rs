//! Duration parsing errors.

use thiserror::Error;

/// Errors that can occur when reading a duration expression
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DurationError {
    #[error("Duration expression is empty")]
    Empty,

    #[error("Expected a number before '{fragment}'")]
    MissingNumber { fragment: String },

    #[error("Number '{number}' has no unit")]
    MissingUnit { number: String },

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("Unknown duration unit '{unit}'")]
    UnknownUnit { unit: String },

    #[error("Duration is too large")]
    Overflow,

    #[error("Duration '{expr}' is shorter than one second")]
    Zero { expr: String },
}
