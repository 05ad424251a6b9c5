use error_types::ServiceError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A document with the same `_id` already exists
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The update cannot be applied to the matched document's shape
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => ServiceError::Conflict(msg),
            StoreError::InvalidDocument(msg) | StoreError::InvalidUpdate(msg) => {
                ServiceError::BadInput(msg)
            }
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}
