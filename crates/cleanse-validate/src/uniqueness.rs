//! Uniqueness of declared-unique fields.

use std::collections::HashMap;

use cleanse_model::is_blank;
use serde_json::Value;

/// A repeated value: `row` duplicates the value first seen at `first_row`.
#[derive(Debug, Clone, PartialEq)]
pub struct Duplicate {
    pub row: usize,
    pub first_row: usize,
    pub value: Value,
}

/// Comparison key: text is trimmed and case-folded, other scalars use their
/// JSON rendering.
pub fn uniqueness_key(value: &Value) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    Some(match value {
        Value::String(text) => text.trim().to_lowercase(),
        other => other.to_string(),
    })
}

/// Finds every occurrence after the first of each repeated value. Blank
/// values never collide.
pub fn find_duplicates<'a>(values: impl IntoIterator<Item = (usize, &'a Value)>) -> Vec<Duplicate> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for (row, value) in values {
        let Some(key) = uniqueness_key(value) else {
            continue;
        };
        match first_seen.get(&key) {
            Some(&first_row) => duplicates.push(Duplicate {
                row,
                first_row,
                value: value.clone(),
            }),
            None => {
                first_seen.insert(key, row);
            }
        }
    }
    duplicates
}
