use thiserror::Error;

use mango_core::error::MangoError;

/// Errors raised by the in-memory driver.
///
/// Surfaced to callers as [`MangoError::Driver`]; recover the concrete value with
/// [`MangoError::driver_error`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    #[error("Duplicate key {0} in collection {1}")]
    DuplicateKey(String, String),
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),
    #[error("Performing an update would modify the immutable field '_id'")]
    ImmutableId,
}

pub type MemoryResult<T> = Result<T, MemoryError>;

impl From<MemoryError> for MangoError {
    fn from(err: MemoryError) -> Self {
        MangoError::driver(err)
    }
}
