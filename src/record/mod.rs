//! Record model for squatlog
//!
//! A record is one free-form key/value event submitted by a client.
//! Field order is the order the producer sent (or, after recovery, the
//! order of the log header).
//!
//! # Invariants
//!
//! - A stored record always carries `timestamp`
//! - Records are immutable once stored

mod cell;
mod timestamp;

pub use cell::{coerce_cell, is_numeric_field, Cell, NUMERIC_FIELDS};
pub use timestamp::{now_timestamp, TIMESTAMP_FIELD};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a payload cannot become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Payload is valid JSON but not an object
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Payload is an object without any fields
    #[error("payload must contain at least one field")]
    Empty,
}

/// One exercise-repetition event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record (used by the log reader while assembling rows)
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a decoded request body.
    ///
    /// Only non-empty JSON objects are accepted.
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) if map.is_empty() => Err(RecordError::Empty),
            Value::Object(map) => Ok(Self(map)),
            other => Err(RecordError::NotAnObject(json_kind(&other))),
        }
    }

    /// Look up a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether the field key is present (a null value still counts)
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Insert or replace a field, keeping first-insertion order
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Field names in record order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fill `timestamp` with `now()` when the key is missing.
    ///
    /// Returns true if the field was added.
    pub fn fill_timestamp_with(&mut self, now: impl FnOnce() -> String) -> bool {
        if self.contains(TIMESTAMP_FIELD) {
            return false;
        }
        self.insert(TIMESTAMP_FIELD, Value::String(now()));
        true
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_object() {
        let record = Record::from_json(json!({"count": 5, "knee_angle": 92.3})).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("count"), Some(&json!(5)));
    }

    #[test]
    fn test_from_json_rejects_empty_object() {
        assert_eq!(Record::from_json(json!({})), Err(RecordError::Empty));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert_eq!(
            Record::from_json(json!([1, 2])),
            Err(RecordError::NotAnObject("array"))
        );
        assert_eq!(
            Record::from_json(json!("squat")),
            Err(RecordError::NotAnObject("string"))
        );
        assert_eq!(Record::from_json(Value::Null), Err(RecordError::NotAnObject("null")));
    }

    #[test]
    fn test_field_order_is_preserved() {
        let record = Record::from_json(json!({"z": 1, "a": 2, "m": 3})).unwrap();
        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_fill_timestamp_only_when_missing() {
        let mut record = Record::from_json(json!({"count": 1})).unwrap();
        assert!(record.fill_timestamp_with(|| "2024-01-01T10:00:00".to_string()));
        assert_eq!(record.get("timestamp"), Some(&json!("2024-01-01T10:00:00")));

        assert!(!record.fill_timestamp_with(|| "later".to_string()));
        assert_eq!(record.get("timestamp"), Some(&json!("2024-01-01T10:00:00")));
    }

    #[test]
    fn test_null_timestamp_is_kept() {
        let mut record = Record::from_json(json!({"timestamp": null})).unwrap();
        assert!(!record.fill_timestamp_with(|| "now".to_string()));
        assert_eq!(record.get("timestamp"), Some(&Value::Null));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let record = Record::from_json(json!({"count": 5})).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"count":5}"#);
    }
}
