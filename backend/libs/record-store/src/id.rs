//! Record identifiers
//!
//! Ids travel as canonical hyphenated lowercase UUID strings. Anything else
//! (uppercase, braces, `urn:` prefix, simple form) is rejected rather than
//! normalized, so a string accepted here compares equal to its stored form.

use error_types::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid id for field '{field}': {details}")]
    InvalidFormat { field: String, details: String },
}

impl From<IdError> for ServiceError {
    fn from(err: IdError) -> Self {
        ServiceError::BadInput(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse and validate an id, naming `field` in the error
    ///
    /// # Examples
    ///
    /// ```
    /// use record_store::RecordId;
    ///
    /// let id = RecordId::parse("550e8400-e29b-41d4-a716-446655440000", "quote_id").unwrap();
    /// assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    ///
    /// let err = RecordId::parse("550E8400-E29B-41D4-A716-446655440000", "quote_id").unwrap_err();
    /// assert!(err.to_string().contains("quote_id"));
    /// ```
    pub fn parse(input: &str, field: &str) -> Result<Self, IdError> {
        let uuid = Uuid::parse_str(input).map_err(|e| IdError::InvalidFormat {
            field: field.to_string(),
            details: e.to_string(),
        })?;

        let id = Self(uuid);
        if id.to_string() != input {
            return Err(IdError::InvalidFormat {
                field: field.to_string(),
                details: "expected canonical lowercase hyphenated form".to_string(),
            });
        }
        Ok(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl TryFrom<String> for RecordId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value, "id")
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}
