//! Document predicates
//!
//! A [`Filter`] is an optional id match plus a conjunction of [`Condition`]s.
//! Semantics follow the usual document-store conventions: a missing field
//! never equals anything, never satisfies `Gte`, and trivially satisfies
//! `KeyAbsent` and `NotContains`.

use crate::{Document, RecordId, ID_FIELD};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field == value`
    Eq { field: String, value: Value },
    /// `field` is an integer `>= min`
    Gte { field: String, min: i64 },
    /// `field` (an object) has no entry named `key`
    KeyAbsent { field: String, key: String },
    /// `field` (an array) does not contain `value`
    NotContains { field: String, value: Value },
    /// `field` (an array) contains `value`
    Contains { field: String, value: Value },
}

impl Condition {
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Condition::Eq { field, value } => document.get(field) == Some(value),
            Condition::Gte { field, min } => document
                .get(field)
                .and_then(Value::as_i64)
                .map(|n| n >= *min)
                .unwrap_or(false),
            Condition::KeyAbsent { field, key } => match document.get(field) {
                Some(Value::Object(entries)) => !entries.contains_key(key),
                _ => true,
            },
            Condition::NotContains { field, value } => !array_contains(document, field, value),
            Condition::Contains { field, value } => array_contains(document, field, value),
        }
    }
}

fn array_contains(document: &Document, field: &str, value: &Value) -> bool {
    document
        .get(field)
        .and_then(Value::as_array)
        .map(|items| items.contains(value))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    id: Option<RecordId>,
    conditions: Vec<Condition>,
}

impl Filter {
    /// Match every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            conditions: Vec::new(),
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: impl Into<String>, min: i64) -> Self {
        self.conditions.push(Condition::Gte {
            field: field.into(),
            min,
        });
        self
    }

    pub fn key_absent(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.conditions.push(Condition::KeyAbsent {
            field: field.into(),
            key: key.into(),
        });
        self
    }

    pub fn not_contains(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::NotContains {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn contains(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Contains {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, document: &Document) -> bool {
        if let Some(id) = self.id {
            let stored = document.get(ID_FIELD).and_then(Value::as_str);
            if stored != Some(id.to_string().as_str()) {
                return false;
            }
        }
        self.conditions.iter().all(|c| c.matches(document))
    }

    /// Scalar equality conditions as a JSON object, for containment pushdown
    pub(crate) fn scalar_equalities(&self) -> Document {
        self.conditions
            .iter()
            .filter_map(|c| match c {
                Condition::Eq { field, value }
                    if !matches!(value, Value::Array(_) | Value::Object(_)) =>
                {
                    Some((field.clone(), value.clone()))
                }
                _ => None,
            })
            .collect()
    }
}
