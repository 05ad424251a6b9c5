use super::guarded;
use crate::models::{Quote, QUOTES};
use error_types::ServiceError;
use record_store::{Document, DocumentStore, Filter, RecordId, Update};
use std::sync::Arc;
use std::time::Duration;

/// Repository for the `quotes` collection
#[derive(Clone)]
pub struct QuoteRepository {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl QuoteRepository {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<Quote>, ServiceError> {
        let found = guarded(
            self.timeout,
            "find quote",
            self.store.find_one(QUOTES, &Filter::by_id(id)),
        )
        .await?;
        found.map(Quote::from_document).transpose()
    }

    pub async fn insert(&self, document: Document) -> Result<RecordId, ServiceError> {
        guarded(self.timeout, "insert quote", self.store.insert_one(QUOTES, document)).await
    }

    pub async fn update(&self, filter: &Filter, update: &Update) -> Result<u64, ServiceError> {
        guarded(
            self.timeout,
            "update quote",
            self.store.update_one(QUOTES, filter, update),
        )
        .await
    }

    pub async fn delete(&self, id: RecordId) -> Result<u64, ServiceError> {
        guarded(
            self.timeout,
            "delete quote",
            self.store.delete_one(QUOTES, &Filter::by_id(id)),
        )
        .await
    }
}
