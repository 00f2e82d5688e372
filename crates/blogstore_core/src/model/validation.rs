//! Client-input validation errors.

use thiserror::Error;

/// Malformed client input rejected before any SQL is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("post title cannot be empty")]
    EmptyTitle,
    /// Title has no character that transliterates to an ASCII letter or digit.
    #[error("post title `{0}` does not produce a usable slug")]
    UnsluggableTitle(String),
    #[error("tag name cannot be empty")]
    EmptyTagName,
    #[error("invalid {field} value `{value}`: expected an integer")]
    InvalidPagination { field: &'static str, value: String },
    #[error("invalid id `{0}`")]
    InvalidId(String),
}
