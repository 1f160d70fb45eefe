//! Set-valued array deduplication.

use std::collections::HashSet;

use cleanse_normalization::coerce_integer;
use serde_json::Value;

/// Result of deduplicating one array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayDedup {
    pub items: Vec<Value>,
    /// Repeated elements removed.
    pub removed: usize,
    /// Elements dropped because they are not of the element type.
    pub invalid: Vec<Value>,
}

impl ArrayDedup {
    pub fn changed(&self) -> bool {
        self.removed > 0 || !self.invalid.is_empty()
    }
}

/// Coerces elements to integers and keeps the first occurrence of each.
pub fn dedup_integer_array(items: &[Value]) -> ArrayDedup {
    let mut seen = HashSet::new();
    let mut result = ArrayDedup::default();
    for item in items {
        match coerce_integer(item).value() {
            Some(n) => {
                if seen.insert(n) {
                    result.items.push(Value::from(n));
                } else {
                    result.removed += 1;
                }
            }
            None => result.invalid.push(item.clone()),
        }
    }
    result
}

/// Keeps the first occurrence of each trimmed text element. Numbers are
/// rendered as text; other elements are invalid.
pub fn dedup_text_array(items: &[Value]) -> ArrayDedup {
    let mut seen = HashSet::new();
    let mut result = ArrayDedup::default();
    for item in items {
        let text = match item {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => {
                result.invalid.push(item.clone());
                continue;
            }
        };
        if text.is_empty() {
            result.invalid.push(item.clone());
        } else if seen.insert(text.clone()) {
            result.items.push(Value::String(text));
        } else {
            result.removed += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn integer_dedup_keeps_first_occurrence_order() {
        let result = dedup_integer_array(&[json!(190), json!(190), json!(225), json!(350)]);
        assert_eq!(result.items, vec![json!(190), json!(225), json!(350)]);
        assert_eq!(result.removed, 1);
        assert!(result.invalid.is_empty());
    }

    #[test]
    fn integer_dedup_coerces_and_drops_invalid() {
        let result = dedup_integer_array(&[json!("410"), json!(410.0), json!("abc"), json!(510)]);
        assert_eq!(result.items, vec![json!(410), json!(510)]);
        assert_eq!(result.invalid, vec![json!("abc")]);
    }

    #[test]
    fn text_dedup_trims() {
        let result = dedup_text_array(&[json!("FRAGILE"), json!(" FRAGILE "), json!(3), json!(null)]);
        assert_eq!(result.items, vec![json!("FRAGILE"), json!("3")]);
        assert_eq!(result.removed, 1);
        assert_eq!(result.invalid, vec![json!(null)]);
    }
}
