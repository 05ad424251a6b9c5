//! Keyed document store for the quote platform
//!
//! Collections hold JSON objects addressed by a [`RecordId`] stored under
//! `_id`. Every write is a single-document operation; [`DocumentStore::update_one`]
//! evaluates its [`Filter`] and applies its [`Update`] atomically, which is the
//! only concurrency primitive the services rely on.
//!
//! Two backends:
//! - [`MemoryStore`]: process-local, used by tests and when no database is configured
//! - [`PgDocumentStore`]: PostgreSQL JSONB table `documents`

pub mod error;
pub mod filter;
pub mod id;
pub mod memory;
pub mod postgres;
pub mod update;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use error::StoreError;
pub use filter::{Condition, Filter};
pub use id::{IdError, RecordId};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use update::{Update, UpdateOp};

/// A stored JSON object
pub type Document = Map<String, Value>;

/// Field holding the record id inside every document
pub const ID_FIELD: &str = "_id";

/// Abstract keyed document store
///
/// Counts returned by `update_one` / `delete_one` are 0 or 1: at most one
/// document is touched. `update_one` counts a document only when the update
/// actually changed it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Insert a document, assigning a fresh id unless it already carries a valid `_id`
    async fn insert_one(&self, collection: &str, document: Document)
        -> Result<RecordId, StoreError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, StoreError>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

/// Resolve the id a new document will be stored under and write it into `_id`
pub(crate) fn assign_id(document: &mut Document) -> Result<RecordId, StoreError> {
    let id = match document.get(ID_FIELD) {
        None | Some(Value::Null) => RecordId::new(),
        Some(Value::String(raw)) => RecordId::parse(raw, ID_FIELD)
            .map_err(|e| StoreError::InvalidDocument(e.to_string()))?,
        Some(other) => {
            return Err(StoreError::InvalidDocument(format!(
                "_id must be a string, got {}",
                other
            )))
        }
    };
    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(id)
}
