#![allow(dead_code)]

use access_control::{LookupError, PrincipalResolver};
use async_trait::async_trait;
use chrono::Duration as TokenTtl;
use crypto_core::test_keys::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
use crypto_core::{TokenIssuer, TokenVerifier};
use quote_service::clients::AccountReferences;
use quote_service::models::QUOTES;
use quote_service::AppState;
use record_store::{DocumentStore, MemoryStore, RecordId};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(2);

/// Records reference calls; optionally fails them all
#[derive(Default)]
pub struct StubAccounts {
    pub calls: Mutex<Vec<(&'static str, String, RecordId)>>,
    pub unreachable: bool,
}

impl StubAccounts {
    fn record(&self, op: &'static str, account: &str, quote: &RecordId) -> Result<(), LookupError> {
        self.calls
            .lock()
            .unwrap()
            .push((op, account.to_string(), *quote));
        if self.unreachable {
            Err(LookupError::Unreachable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AccountReferences for StubAccounts {
    async fn insert_reference(&self, account: &str, quote: &RecordId, _auth: &str) -> Result<(), LookupError> {
        self.record("insert", account, quote)
    }

    async fn remove_reference(&self, account: &str, quote: &RecordId, _auth: &str) -> Result<(), LookupError> {
        self.record("remove", account, quote)
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub accounts: Arc<StubAccounts>,
    pub resolver: Arc<PrincipalResolver>,
    pub state: AppState,
}

impl Fixture {
    pub fn new(accounts: StubAccounts) -> Self {
        let store = Arc::new(MemoryStore::new());
        let accounts = Arc::new(accounts);
        let resolver = Arc::new(PrincipalResolver::new(
            TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).unwrap(),
        ));
        let state = AppState::new(store.clone(), "memory", accounts.clone(), TIMEOUT);
        Self {
            store,
            accounts,
            resolver,
            state,
        }
    }

    pub async fn seed_quote(&self, creator: &str, bookmarks: i64) -> RecordId {
        let Value::Object(document) = json!({
            "quote": "Simplicity is prerequisite for reliability",
            "author": "Dijkstra",
            "creator": creator,
            "tags": [],
            "bookmarks": bookmarks,
        }) else {
            unreachable!()
        };
        self.store.insert_one(QUOTES, document).await.unwrap()
    }

    pub async fn bookmarks(&self, id: RecordId) -> i64 {
        self.state.quotes.get(id).await.unwrap().bookmarks
    }
}

pub fn bearer(subject: &str) -> String {
    let token = TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY)
        .unwrap()
        .issue(subject, "user", TokenTtl::minutes(5))
        .unwrap();
    format!("Bearer {token}")
}
