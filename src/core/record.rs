//! Type-erased record values manipulated by the engines
//!
//! A [`Record`] carries its type as a string and its columns as a JSON
//! field map. This keeps the policy layer completely decoupled from
//! concrete domain types: the registry decides what the fields mean
//! (which column is the deletion marker, which columns are foreign keys),
//! and the engines never need compile-time knowledge of the schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A single record of some registered type.
///
/// All records have:
/// - id: Unique identifier
/// - record_type: Registered type name (e.g., "order", "invoice")
/// - fields: Column values as a JSON map (the deletion marker lives here)
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
///
/// CRITICAL: `record_type` is a String, not an enum, to maintain complete
/// decoupling from specific domain types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Unique identifier for this record
    pub id: Uuid,

    /// The registered type name
    pub record_type: String,

    /// Column values, keyed by column name
    #[serde(default)]
    pub fields: Map<String, Value>,

    /// When this record was created
    pub created_at: DateTime<Utc>,

    /// When this record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create a new record of the given type with an empty field map
    pub fn new(record_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            record_type: record_type.into(),
            fields: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Get a field value. Absent fields read as `Value::Null`.
    pub fn get(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Resolve a column for predicate evaluation.
    ///
    /// The pseudo-column `id` resolves to the record id so predicates can
    /// select or exclude specific rows.
    pub fn lookup(&self, field: &str) -> Value {
        if field == "id" {
            return Value::String(self.id.to_string());
        }
        self.get(field).clone()
    }

    /// Set a field value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Get a field as a string slice, if it holds one
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    /// Get a field as a UUID, if it holds a parseable one.
    ///
    /// Foreign keys are stored as UUID strings; this is the read side.
    pub fn uuid_field(&self, field: &str) -> Option<Uuid> {
        self.str_field(field).and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Update the `updated_at` timestamp to now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_record_has_empty_fields() {
        let record = Record::new("order");
        assert_eq!(record.record_type, "order");
        assert!(record.fields.is_empty());
        assert_eq!(record.get("missing"), &Value::Null);
    }

    #[test]
    fn test_with_and_get() {
        let record = Record::new("order")
            .with("name", "Order #1")
            .with("amount", 100);

        assert_eq!(record.str_field("name"), Some("Order #1"));
        assert_eq!(record.get("amount"), &json!(100));
    }

    #[test]
    fn test_uuid_field_round_trip() {
        let other = Uuid::new_v4();
        let record = Record::new("order").with("customer_id", other.to_string());

        assert_eq!(record.uuid_field("customer_id"), Some(other));
        assert_eq!(record.uuid_field("name"), None);
    }

    #[test]
    fn test_lookup_resolves_id_pseudo_column() {
        let record = Record::new("order");
        assert_eq!(record.lookup("id"), Value::String(record.id.to_string()));
    }

    #[test]
    fn test_touch_advances_updated_at() {
        let mut record = Record::new("order");
        let before = record.updated_at;
        record.touch();
        assert!(record.updated_at >= before);
    }
}
