//! Process-local document store
//!
//! Filter evaluation and update application for one `update_one` call run
//! under a single write lock, so conditional updates are atomic with respect
//! to every other operation on the store.

use crate::{assign_id, Document, DocumentStore, Filter, RecordId, StoreError, Update};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type Collection = BTreeMap<RecordId, Document>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    fn locate(documents: &Collection, filter: &Filter) -> Option<RecordId> {
        match filter.id() {
            Some(id) => documents
                .get(&id)
                .filter(|doc| filter.matches(doc))
                .map(|_| id),
            None => documents
                .iter()
                .find(|(_, doc)| filter.matches(doc))
                .map(|(id, _)| *id),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(None);
        };
        Ok(Self::locate(documents, filter).and_then(|id| documents.get(&id).cloned()))
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<RecordId, StoreError> {
        let id = assign_id(&mut document)?;
        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("{collection}/{id}")));
        }
        documents.insert(id, document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(id) = Self::locate(documents, filter) else {
            return Ok(0);
        };
        let Some(document) = documents.get_mut(&id) else {
            return Ok(0);
        };
        let changed = update.apply(document)?;
        Ok(u64::from(changed))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(id) = Self::locate(documents, filter) else {
            return Ok(0);
        };
        Ok(u64::from(documents.remove(&id).is_some()))
    }
}
