//! Account-side records
//!
//! Field names on the wire and in the store are camelCase. Accounts carry
//! arbitrary profile fields besides the ones modelled here; they round-trip
//! untouched through `profile`.

use access_control::AccountRecord;
use chrono::{DateTime, Utc};
use error_types::ServiceError;
use record_store::{Document, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const ACCOUNTS: &str = "accounts";
pub const USAGE_COUNTERS: &str = "usage_counters";

pub mod fields {
    pub const ID: &str = "_id";
    pub const EMAIL: &str = "email";
    pub const ADMIN: &str = "admin";
    pub const USED_QUOTES: &str = "usedQuotes";
    pub const MY_QUOTES: &str = "myQuotes";
    pub const BOOKMARKED_QUOTES: &str = "bookmarkedQuotes";
    pub const COUNT: &str = "count";
    pub const LAST_USED_AT: &str = "lastUsedAt";
}

/// Session fields left behind by the OAuth login flow
pub const OAUTH_FIELDS: [&str; 5] = [
    "access_token",
    "refresh_token",
    "expires_at",
    "scope",
    "token_type",
];

/// Fields the generic update endpoint may not write
///
/// `myQuotes` only changes through the ownership-checked endpoints and
/// `bookmarkedQuotes` only alongside the quote's bookmark counter.
pub const PROTECTED_FIELDS: [&str; 5] = [
    fields::ID,
    fields::ADMIN,
    fields::USED_QUOTES,
    fields::MY_QUOTES,
    fields::BOOKMARKED_QUOTES,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 1 = administrator
    #[serde(default)]
    pub admin: i64,
    /// quote id -> usage counter id
    #[serde(default)]
    pub used_quotes: BTreeMap<String, String>,
    #[serde(default)]
    pub my_quotes: Vec<String>,
    #[serde(default)]
    pub bookmarked_quotes: Vec<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Account {
    pub fn from_document(document: Document) -> Result<Self, ServiceError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| ServiceError::Internal(format!("Stored account is malformed: {e}")))
    }

    /// Projection returned by public reads: everything but OAuth session data
    pub fn public_view(&self) -> Value {
        let mut view = self.private_view();
        if let Value::Object(map) = &mut view {
            for field in OAUTH_FIELDS {
                map.remove(field);
            }
        }
        view
    }

    /// Full record, returned only to its owner
    pub fn private_view(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl AccountRecord for Account {
    fn record_id(&self) -> RecordId {
        self.id
    }

    fn is_admin(&self) -> bool {
        self.admin == 1
    }
}

/// Body of `POST /users/accounts/create`
///
/// Only `email` is required; everything else is stored as given, except the
/// fields the service owns, which always start empty.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl NewAccount {
    pub fn into_document(self) -> Result<Document, ServiceError> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(ServiceError::BadInput("email must not be empty".into()));
        }

        let mut document = self.rest;
        document.remove(fields::ID);
        document.insert(fields::EMAIL.into(), Value::String(email));
        document.insert(fields::ADMIN.into(), Value::from(0));
        document.insert(fields::USED_QUOTES.into(), Value::Object(Map::new()));
        document.insert(fields::MY_QUOTES.into(), Value::Array(Vec::new()));
        document.insert(fields::BOOKMARKED_QUOTES.into(), Value::Array(Vec::new()));
        Ok(document)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounter {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub count: i64,
    pub last_used_at: DateTime<Utc>,
}

impl UsageCounter {
    pub fn from_document(document: Document) -> Result<Self, ServiceError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| ServiceError::Internal(format!("Stored usage counter is malformed: {e}")))
    }
}

/// Outcome of one recorded use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub counter_id: RecordId,
    pub count: i64,
    pub last_used_at: DateTime<Utc>,
    /// True when this call created the counter
    pub first_use: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account_json(id: RecordId) -> Value {
        json!({
            "_id": id.to_string(),
            "email": "ada@example.com",
            "username": "ada",
            "admin": 0,
            "usedQuotes": {"q1": "c1"},
            "myQuotes": [],
            "bookmarkedQuotes": ["q2"],
            "profession": "engineer",
            "access_token": "secret",
            "refresh_token": "secret",
            "expires_at": 1700000000,
        })
    }

    #[test]
    fn test_profile_fields_round_trip() {
        let id = RecordId::new();
        let doc = account_json(id).as_object().cloned().unwrap();
        let account = Account::from_document(doc).unwrap();
        assert_eq!(account.profile["profession"], "engineer");
        assert_eq!(account.private_view()["profession"], "engineer");
        assert_eq!(account.private_view()["usedQuotes"]["q1"], "c1");
    }

    #[test]
    fn test_public_view_strips_oauth_fields() {
        let doc = account_json(RecordId::new()).as_object().cloned().unwrap();
        let view = Account::from_document(doc).unwrap().public_view();
        for field in OAUTH_FIELDS {
            assert!(view.get(field).is_none(), "{field} leaked");
        }
        assert_eq!(view["email"], "ada@example.com");
    }

    #[test]
    fn test_admin_flag() {
        let mut doc = account_json(RecordId::new()).as_object().cloned().unwrap();
        doc.insert("admin".into(), json!(1));
        assert!(Account::from_document(doc).unwrap().is_admin());
    }

    #[test]
    fn test_new_account_resets_owned_fields() {
        let body: NewAccount = serde_json::from_value(json!({
            "_id": "attacker-chosen",
            "email": " ada@example.com ",
            "admin": 1,
            "usedQuotes": {"q": "c"},
            "myQuotes": ["someone-elses-quote"],
            "profession": "engineer",
        }))
        .unwrap();
        let doc = body.into_document().unwrap();
        assert!(doc.get("_id").is_none());
        assert_eq!(doc["email"], "ada@example.com");
        assert_eq!(doc["admin"], 0);
        assert_eq!(doc["usedQuotes"], json!({}));
        assert_eq!(doc["myQuotes"], json!([]));
        assert_eq!(doc["bookmarkedQuotes"], json!([]));
        assert_eq!(doc["profession"], "engineer");
    }
}
