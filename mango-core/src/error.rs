//! Error types and result types for record mapping and collection operations.
//!
//! Use [`MangoResult<T>`] as the return type for fallible operations. Errors raised by
//! the underlying driver are carried in [`MangoError::Driver`] without translation.

use std::error::Error as StdError;

use bson::error::Error as BsonError;
use thiserror::Error;

/// Boxed error type used to carry driver failures unchanged.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Represents all errors surfaced by the mapping layer.
#[derive(Error, Debug)]
pub enum MangoError {
    /// An identifier-dependent operation was invoked on a record without a usable identifier.
    #[error("Record must have an identifier field with a non-empty value")]
    MissingIdentifierField,
    /// The record could not be serialized into a document or decoded from one.
    #[error("Transformation error: {0}")]
    Transformation(String),
    /// A value of an unsupported type was injected into an identifier field.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Error during driver construction or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// An error raised by the underlying driver, passed through unmodified.
    #[error("Driver error: {0}")]
    Driver(#[source] BoxError),
}

impl MangoError {
    /// Wraps a driver error, keeping it available through [`std::error::Error::source`].
    pub fn driver<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        MangoError::Driver(Box::new(err))
    }

    /// Attempts to view a driver error as the concrete error type of that driver.
    pub fn driver_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            MangoError::Driver(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for mapping and collection operations.
pub type MangoResult<T> = Result<T, MangoError>;

impl From<BsonError> for MangoError {
    fn from(err: BsonError) -> Self {
        MangoError::Transformation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl StdError for Refused {}

    #[test]
    fn driver_errors_keep_their_source() {
        let err = MangoError::driver(Refused);

        assert_eq!(err.to_string(), "Driver error: connection refused");
        assert!(err.driver_error::<Refused>().is_some());
        assert!(err.source().is_some());
    }

    #[test]
    fn non_driver_errors_have_no_driver_error() {
        assert!(
            MangoError::MissingIdentifierField
                .driver_error::<Refused>()
                .is_none()
        );
    }
}
