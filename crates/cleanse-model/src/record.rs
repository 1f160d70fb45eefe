//! Record representation.
//!
//! Records are mutable JSON objects. Field order is preserved so that the
//! cleaned output mirrors the schema order and reports mirror the input.

use serde_json::{Map, Value};

/// One raw or cleaned record: field name to JSON value.
pub type Record = Map<String, Value>;

/// Returns true for the absent sentinel: null, empty or whitespace-only text,
/// and empty arrays.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Renders a value the way reports show it: strings unquoted, null empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Convenience accessors over [`Record`].
pub trait RecordExt {
    /// Text content of a field, if it holds a string.
    fn text(&self, field: &str) -> Option<&str>;

    /// Trimmed non-empty text content of a field.
    fn non_empty_text(&self, field: &str) -> Option<&str>;

    /// True when the field is missing or holds the absent sentinel.
    fn is_blank_field(&self, field: &str) -> bool;

    /// Integer value of a field when it is a JSON integer.
    fn integer(&self, field: &str) -> Option<i64>;

    /// Replaces a field value and returns the previous one.
    fn replace(&mut self, field: &str, value: Value) -> Option<Value>;
}

impl RecordExt for Record {
    fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    fn non_empty_text(&self, field: &str) -> Option<&str> {
        self.text(field)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    fn is_blank_field(&self, field: &str) -> bool {
        self.get(field).is_none_or(is_blank)
    }

    fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    fn replace(&mut self, field: &str, value: Value) -> Option<Value> {
        self.insert(field.to_string(), value)
    }
}
