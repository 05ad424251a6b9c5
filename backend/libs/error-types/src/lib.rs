//! Unified error taxonomy for the quote platform services
//!
//! Every denial or failure that crosses a service boundary is expressed as a
//! [`ServiceError`]. Callers branch on [`ErrorKind`] (or the `error` field of
//! the JSON body), never on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Unified error type for the authorization and counter core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing/malformed Authorization header, invalid token, incomplete claims
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the policy denies the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A remote check could not be completed
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Target account/resource/counter absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conditional update matched nothing although the target exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed identifiers or request bodies
    #[error("Bad input: {0}")]
    BadInput(String),

    /// Store or infrastructure failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable, message-independent error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    UpstreamUnavailable,
    NotFound,
    Conflict,
    BadInput,
    Internal,
}

impl ErrorKind {
    /// Wire code used in the `error` field of [`ErrorResponse`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::BadInput => "BAD_INPUT",
            Self::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::UpstreamUnavailable => 503,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::BadInput => 400,
            Self::Internal => 500,
        }
    }

    /// Inverse of [`ErrorKind::status_code`], used by HTTP clients
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            400 | 422 => Self::BadInput,
            502..=504 => Self::UpstreamUnavailable,
            _ => Self::Internal,
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Check if this is a retryable error
    ///
    /// `Unauthorized` and `Forbidden` are terminal. A `Conflict` from a
    /// counter guard never applied its delta, so retrying is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable(_) | Self::Conflict(_) | Self::Internal(_)
        )
    }

    /// Message safe to return to clients
    pub fn public_message(&self) -> String {
        match self {
            // Don't leak internal details
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// JSON error body returned by every service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self {
            error: err.kind(),
            message: err.public_message(),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::BadInput(format!("Cannot parse JSON: {}", err))
    }
}

#[cfg(feature = "actix")]
mod actix {
    use super::{ErrorResponse, ServiceError};
    use actix_web::{http::StatusCode, HttpResponse, ResponseError};

    impl ResponseError for ServiceError {
        fn status_code(&self) -> StatusCode {
            StatusCode::from_u16(ServiceError::status_code(self))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }

        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(ResponseError::status_code(self)).json(ErrorResponse::from(self))
        }
    }
}
