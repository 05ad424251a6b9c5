#![allow(dead_code)]

use access_control::{LookupError, OwnershipLookup, PrincipalResolver, UpstreamAuthMode};
use account_service::app::Upstreams;
use account_service::clients::QuoteBookmarks;
use account_service::models::ACCOUNTS;
use account_service::AppState;
use async_trait::async_trait;
use chrono::Duration as TokenTtl;
use crypto_core::test_keys::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
use crypto_core::{TokenIssuer, TokenVerifier};
use record_store::{Document, DocumentStore, MemoryStore, RecordId};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(2);

/// In-process stand-in for the quote service
#[derive(Default)]
pub struct StubQuotes {
    creators: Mutex<HashMap<RecordId, String>>,
    fail_bookmarks: Mutex<Option<LookupError>>,
    pub lookups: Mutex<Vec<(RecordId, Option<String>)>>,
    pub bookmark_calls: Mutex<Vec<(&'static str, RecordId, String)>>,
}

impl StubQuotes {
    pub fn with_quote(self, quote_id: RecordId, creator: &str) -> Self {
        self.creators
            .lock()
            .unwrap()
            .insert(quote_id, creator.to_string());
        self
    }

    pub fn fail_bookmarks_with(&self, error: LookupError) {
        *self.fail_bookmarks.lock().unwrap() = Some(error);
    }

    fn bookmark(&self, op: &'static str, quote_id: &RecordId, auth: &str) -> Result<(), LookupError> {
        self.bookmark_calls
            .lock()
            .unwrap()
            .push((op, *quote_id, auth.to_string()));
        match self.fail_bookmarks.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OwnershipLookup for StubQuotes {
    async fn fetch_creator(
        &self,
        resource_id: &RecordId,
        authorization: Option<&str>,
    ) -> Result<String, LookupError> {
        self.lookups
            .lock()
            .unwrap()
            .push((*resource_id, authorization.map(str::to_string)));
        self.creators
            .lock()
            .unwrap()
            .get(resource_id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(resource_id.to_string()))
    }
}

#[async_trait]
impl QuoteBookmarks for StubQuotes {
    async fn increment_bookmark(&self, quote_id: &RecordId, auth: &str) -> Result<(), LookupError> {
        self.bookmark("increment", quote_id, auth)
    }

    async fn decrement_bookmark(&self, quote_id: &RecordId, auth: &str) -> Result<(), LookupError> {
        self.bookmark("decrement", quote_id, auth)
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub quotes: Arc<StubQuotes>,
    pub resolver: Arc<PrincipalResolver>,
    pub state: AppState,
}

impl Fixture {
    pub fn new(quotes: StubQuotes) -> Self {
        let store = Arc::new(MemoryStore::new());
        let quotes = Arc::new(quotes);
        let resolver = Arc::new(PrincipalResolver::new(
            TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).unwrap(),
        ));
        let state = AppState::new(
            store.clone(),
            "memory",
            resolver.clone(),
            Upstreams {
                ownership: quotes.clone(),
                ownership_mode: UpstreamAuthMode::ForwardCaller,
                bookmarks: quotes.clone(),
            },
            TIMEOUT,
        );
        Self {
            store,
            quotes,
            resolver,
            state,
        }
    }

    /// Insert an account directly into the store
    pub async fn seed_account(&self, email: &str, admin: bool) -> RecordId {
        let Value::Object(document) = json!({
            "email": email,
            "admin": if admin { 1 } else { 0 },
            "usedQuotes": {},
            "myQuotes": [],
            "bookmarkedQuotes": [],
            "access_token": "oauth-secret",
        }) else {
            unreachable!()
        };
        self.store.insert_one(ACCOUNTS, document).await.unwrap()
    }

    pub async fn account(&self, id: RecordId) -> Document {
        self.store
            .find_one(ACCOUNTS, &record_store::Filter::by_id(id))
            .await
            .unwrap()
            .expect("account exists")
    }
}

pub fn bearer(subject: &str) -> String {
    let token = TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY)
        .unwrap()
        .issue(subject, "user", TokenTtl::minutes(5))
        .unwrap();
    format!("Bearer {token}")
}
