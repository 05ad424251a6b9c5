use super::guarded;
use crate::models::{fields, UsageCounter, USAGE_COUNTERS};
use chrono::{DateTime, Utc};
use error_types::ServiceError;
use record_store::{Document, DocumentStore, Filter, RecordId, Update};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
}

/// Repository for the `usage_counters` collection
#[derive(Clone)]
pub struct CounterRepository {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl CounterRepository {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Create a counter for a first use: `count = 1`
    pub async fn insert_first_use(&self, at: DateTime<Utc>) -> Result<RecordId, ServiceError> {
        let mut document = Document::new();
        document.insert(fields::COUNT.into(), Value::from(1));
        document.insert(fields::LAST_USED_AT.into(), timestamp(at));
        guarded(
            self.timeout,
            "insert usage counter",
            self.store.insert_one(USAGE_COUNTERS, document),
        )
        .await
    }

    /// Atomic `count += 1`, `lastUsedAt = at`; returns the modified count
    pub async fn record_repeat_use(
        &self,
        id: RecordId,
        at: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        let update = Update::new()
            .inc(fields::COUNT, 1)
            .set(fields::LAST_USED_AT, timestamp(at));
        guarded(
            self.timeout,
            "increment usage counter",
            self.store
                .update_one(USAGE_COUNTERS, &Filter::by_id(id), &update),
        )
        .await
    }

    pub async fn find(&self, id: RecordId) -> Result<Option<UsageCounter>, ServiceError> {
        let found = guarded(
            self.timeout,
            "find usage counter",
            self.store.find_one(USAGE_COUNTERS, &Filter::by_id(id)),
        )
        .await?;
        found.map(UsageCounter::from_document).transpose()
    }

    pub async fn delete(&self, id: RecordId) -> Result<u64, ServiceError> {
        guarded(
            self.timeout,
            "delete usage counter",
            self.store.delete_one(USAGE_COUNTERS, &Filter::by_id(id)),
        )
        .await
    }
}
