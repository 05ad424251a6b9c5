//! Quote records

use chrono::{SecondsFormat, Utc};
use error_types::ServiceError;
use record_store::{Document, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const QUOTES: &str = "quotes";

pub mod fields {
    pub const ID: &str = "_id";
    pub const QUOTE: &str = "quote";
    pub const CREATOR: &str = "creator";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const DATE: &str = "date";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Account id of whoever created the quote
    pub creator: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Never negative
    #[serde(default)]
    pub bookmarks: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quote {
    pub fn from_document(document: Document) -> Result<Self, ServiceError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| ServiceError::Internal(format!("Stored quote is malformed: {e}")))
    }
}

/// Body of `POST /quotes/create`
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuote {
    pub quote: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl NewQuote {
    /// Build the stored document; `creator` and `bookmarks` are always set here
    pub fn into_document(self, creator: RecordId) -> Result<Document, ServiceError> {
        let text = self.quote.trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::BadInput("quote must not be empty".into()));
        }

        let mut document = self.rest;
        document.remove(fields::ID);
        document.insert(fields::QUOTE.into(), Value::String(text));
        document.insert(fields::CREATOR.into(), Value::String(creator.to_string()));
        document.insert(fields::BOOKMARKS.into(), Value::from(0));
        document.entry(fields::DATE).or_insert_with(|| {
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
        });
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_quote_owned_fields() {
        let creator = RecordId::new();
        let body: NewQuote = serde_json::from_value(json!({
            "quote": " Stay hungry ",
            "author": "Jobs",
            "creator": "someone-else",
            "bookmarks": 99,
            "tags": ["life"],
        }))
        .unwrap();

        let doc = body.into_document(creator).unwrap();
        assert_eq!(doc["quote"], "Stay hungry");
        assert_eq!(doc["creator"], json!(creator.to_string()));
        assert_eq!(doc["bookmarks"], 0);
        assert_eq!(doc["tags"], json!(["life"]));
        assert!(doc.contains_key("date"));
    }

    #[test]
    fn test_blank_quote_rejected() {
        let body: NewQuote = serde_json::from_value(json!({"quote": "  "})).unwrap();
        assert!(matches!(
            body.into_document(RecordId::new()),
            Err(ServiceError::BadInput(_))
        ));
    }

    #[test]
    fn test_quote_round_trips_extra_fields() {
        let id = RecordId::new();
        let doc = json!({
            "_id": id.to_string(),
            "quote": "q",
            "creator": "c",
            "bookmarks": 2,
            "language": "en",
        });
        let quote = Quote::from_document(doc.as_object().cloned().unwrap()).unwrap();
        assert_eq!(quote.bookmarks, 2);
        assert_eq!(quote.extra["language"], "en");
        assert_eq!(serde_json::to_value(&quote).unwrap()["language"], "en");
    }
}
