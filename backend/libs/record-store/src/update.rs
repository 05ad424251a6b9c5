//! Single-document update operators

use crate::{Document, StoreError, ID_FIELD};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set { field: String, value: Value },
    Unset { field: String },
    /// Add `delta` to an integer field; a missing field counts as 0
    Inc { field: String, delta: i64 },
    /// `field[key] = value` on an object field, creating the object if missing
    SetEntry { field: String, key: String, value: Value },
    /// Append to an array field unless already present
    AddToSet { field: String, value: Value },
    /// Remove every occurrence from an array field
    Pull { field: String, value: Value },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update(Vec<UpdateOp>);

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(UpdateOp::Set {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.0.push(UpdateOp::Unset {
            field: field.into(),
        });
        self
    }

    pub fn inc(mut self, field: impl Into<String>, delta: i64) -> Self {
        self.0.push(UpdateOp::Inc {
            field: field.into(),
            delta,
        });
        self
    }

    pub fn set_entry(
        mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.0.push(UpdateOp::SetEntry {
            field: field.into(),
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn add_to_set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(UpdateOp::AddToSet {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn pull(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(UpdateOp::Pull {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply every operator in order; returns whether the document changed
    ///
    /// Validation happens against a scratch copy so a failing operator
    /// leaves `document` untouched.
    pub fn apply(&self, document: &mut Document) -> Result<bool, StoreError> {
        let mut next = document.clone();
        for op in &self.0 {
            apply_op(op, &mut next)?;
        }
        let changed = next != *document;
        *document = next;
        Ok(changed)
    }
}

fn guard_id(field: &str) -> Result<(), StoreError> {
    if field == ID_FIELD {
        return Err(StoreError::InvalidUpdate("_id is immutable".to_string()));
    }
    Ok(())
}

fn apply_op(op: &UpdateOp, document: &mut Document) -> Result<(), StoreError> {
    match op {
        UpdateOp::Set { field, value } => {
            guard_id(field)?;
            document.insert(field.clone(), value.clone());
        }
        UpdateOp::Unset { field } => {
            guard_id(field)?;
            document.remove(field);
        }
        UpdateOp::Inc { field, delta } => {
            guard_id(field)?;
            let current = match document.get(field) {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| {
                    StoreError::InvalidUpdate(format!("cannot increment non-integer field {field}"))
                })?,
            };
            let next = current.checked_add(*delta).ok_or_else(|| {
                StoreError::InvalidUpdate(format!("increment of {field} overflows"))
            })?;
            document.insert(field.clone(), Value::from(next));
        }
        UpdateOp::SetEntry { field, key, value } => {
            guard_id(field)?;
            let entry = document
                .entry(field.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if entry.is_null() {
                *entry = Value::Object(Map::new());
            }
            let entries = entry.as_object_mut().ok_or_else(|| {
                StoreError::InvalidUpdate(format!("{field} is not an object"))
            })?;
            entries.insert(key.clone(), value.clone());
        }
        UpdateOp::AddToSet { field, value } => {
            guard_id(field)?;
            let items = array_field(document, field)?;
            if !items.contains(value) {
                items.push(value.clone());
            }
        }
        UpdateOp::Pull { field, value } => {
            guard_id(field)?;
            let items = array_field(document, field)?;
            items.retain(|item| item != value);
        }
    }
    Ok(())
}

fn array_field<'a>(document: &'a mut Document, field: &str) -> Result<&'a mut Vec<Value>, StoreError> {
    let entry = document
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if entry.is_null() {
        *entry = Value::Array(Vec::new());
    }
    entry
        .as_array_mut()
        .ok_or_else(|| StoreError::InvalidUpdate(format!("{field} is not an array")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_inc_missing_field_starts_at_zero() {
        let mut d = doc(json!({}));
        assert!(Update::new().inc("count", 1).apply(&mut d).unwrap());
        assert_eq!(d["count"], 1);
    }

    #[test]
    fn test_inc_non_integer_fails_without_partial_write() {
        let mut d = doc(json!({"count": "x", "n": 1}));
        let err = Update::new()
            .inc("n", 1)
            .inc("count", 1)
            .apply(&mut d)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate(_)));
        assert_eq!(d["n"], 1);
    }

    #[test]
    fn test_set_entry_creates_map() {
        let mut d = doc(json!({"usedQuotes": null}));
        Update::new()
            .set_entry("usedQuotes", "q1", "c1")
            .apply(&mut d)
            .unwrap();
        assert_eq!(d["usedQuotes"], json!({"q1": "c1"}));
    }

    #[test]
    fn test_add_to_set_repeat_is_not_a_change() {
        let mut d = doc(json!({"myQuotes": ["a"]}));
        assert!(!Update::new().add_to_set("myQuotes", "a").apply(&mut d).unwrap());
        assert!(Update::new().add_to_set("myQuotes", "b").apply(&mut d).unwrap());
        assert_eq!(d["myQuotes"], json!(["a", "b"]));
    }

    #[test]
    fn test_pull_removes_all_occurrences() {
        let mut d = doc(json!({"bookmarkedQuotes": ["a", "b", "a"]}));
        assert!(Update::new().pull("bookmarkedQuotes", "a").apply(&mut d).unwrap());
        assert_eq!(d["bookmarkedQuotes"], json!(["b"]));
    }

    #[test]
    fn test_id_is_immutable() {
        let mut d = doc(json!({"_id": "x"}));
        assert!(Update::new().set("_id", "y").apply(&mut d).is_err());
        assert!(Update::new().unset("_id").apply(&mut d).is_err());
        assert_eq!(d["_id"], "x");
    }
}
