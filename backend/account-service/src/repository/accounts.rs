use super::guarded;
use crate::models::{fields, Account, ACCOUNTS};
use access_control::AccountDirectory;
use async_trait::async_trait;
use error_types::ServiceError;
use record_store::{Document, DocumentStore, Filter, RecordId, Update};
use std::sync::Arc;
use std::time::Duration;

/// Repository for the `accounts` collection
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<Account>, ServiceError> {
        let found = guarded(
            self.timeout,
            "find account",
            self.store.find_one(ACCOUNTS, &Filter::by_id(id)),
        )
        .await?;
        found.map(Account::from_document).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, ServiceError> {
        let filter = Filter::all().eq(fields::EMAIL, email);
        let found = guarded(
            self.timeout,
            "find account by email",
            self.store.find_one(ACCOUNTS, &filter),
        )
        .await?;
        found.map(Account::from_document).transpose()
    }

    pub async fn insert(&self, document: Document) -> Result<RecordId, ServiceError> {
        guarded(
            self.timeout,
            "insert account",
            self.store.insert_one(ACCOUNTS, document),
        )
        .await
    }

    /// Conditional single-document update; returns the modified count
    pub async fn update(&self, filter: &Filter, update: &Update) -> Result<u64, ServiceError> {
        guarded(
            self.timeout,
            "update account",
            self.store.update_one(ACCOUNTS, filter, update),
        )
        .await
    }

    pub async fn delete(&self, id: RecordId) -> Result<u64, ServiceError> {
        guarded(
            self.timeout,
            "delete account",
            self.store.delete_one(ACCOUNTS, &Filter::by_id(id)),
        )
        .await
    }
}

#[async_trait]
impl AccountDirectory for AccountRepository {
    type Account = Account;

    async fn find_account(&self, id: RecordId) -> Result<Option<Account>, ServiceError> {
        self.find_by_id(id).await
    }
}
