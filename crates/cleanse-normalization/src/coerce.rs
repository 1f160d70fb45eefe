//! Type coercers for mixed string/number input.

use serde_json::{Number, Value};

/// Result of coercing one non-blank value.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion<T> {
    /// The value already had the target type.
    Native(T),
    /// The value was converted from another representation.
    Converted(T),
    /// The value cannot be read as the target type.
    Invalid,
}

impl<T> Coercion<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Self::Native(value) | Self::Converted(value) => Some(value),
            Self::Invalid => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }
}

/// Reads a boolean from native booleans, numbers, and the usual spellings.
pub fn coerce_boolean(value: &Value) -> Coercion<bool> {
    match value {
        Value::Bool(flag) => Coercion::Native(*flag),
        Value::Number(number) => match number.as_f64() {
            Some(n) => Coercion::Converted(n != 0.0),
            None => Coercion::Invalid,
        },
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "oui" | "vrai" => Coercion::Converted(true),
            "false" | "0" | "no" | "n" | "non" | "faux" => Coercion::Converted(false),
            _ => Coercion::Invalid,
        },
        _ => Coercion::Invalid,
    }
}

fn integral(n: f64) -> Option<i64> {
    // Exclusive upper bound: 2^63 itself is not representable as i64.
    (n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64)
        .then_some(n as i64)
}

/// Reads an integer from native integers, integer-valued floats, and numeric
/// strings with at most one decimal point.
pub fn coerce_integer(value: &Value) -> Coercion<i64> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                Coercion::Native(n)
            } else {
                match number.as_f64().and_then(integral) {
                    Some(n) => Coercion::Converted(n),
                    None => Coercion::Invalid,
                }
            }
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Coercion::Converted(n);
            }
            if trimmed.matches('.').count() > 1 {
                return Coercion::Invalid;
            }
            match trimmed.parse::<f64>().ok().and_then(integral) {
                Some(n) => Coercion::Converted(n),
                None => Coercion::Invalid,
            }
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => Coercion::Invalid,
    }
}

/// Parses French-style decimals: spaces as thousands separators and a comma
/// as decimal separator.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202F}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if compact.is_empty() || compact.matches('.').count() > 1 {
        return None;
    }
    compact.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Reads a float from native numbers and decimal strings.
pub fn coerce_float(value: &Value) -> Coercion<f64> {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(n) if number.is_f64() => Coercion::Native(n),
            Some(n) => Coercion::Converted(n),
            None => Coercion::Invalid,
        },
        Value::String(text) => match parse_decimal(text) {
            Some(n) => Coercion::Converted(n),
            None => Coercion::Invalid,
        },
        _ => Coercion::Invalid,
    }
}

/// Ratio for a percent field: values above 1 are percentages.
pub fn percent_to_ratio(value: f64) -> f64 {
    if value > 1.0 { value / 100.0 } else { value }
}

/// JSON number for a float, falling back to null for non-finite values.
pub fn float_value(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Outcome of shaping a value as an array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayShape {
    /// Already an array.
    Array(Vec<Value>),
    /// A scalar wrapped into a singleton.
    Wrapped(Vec<Value>),
    /// Absent input.
    Empty,
}

impl ArrayShape {
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Array(items) | Self::Wrapped(items) => items,
            Self::Empty => Vec::new(),
        }
    }
}

/// Shapes a value as an array: arrays pass through, absent values become
/// empty, anything else becomes a singleton.
pub fn coerce_array(value: Option<&Value>) -> ArrayShape {
    match value {
        None | Some(Value::Null) => ArrayShape::Empty,
        Some(Value::String(text)) if text.trim().is_empty() => ArrayShape::Empty,
        Some(Value::Array(items)) => ArrayShape::Array(items.clone()),
        Some(other) => ArrayShape::Wrapped(vec![other.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn booleans() {
        assert_eq!(coerce_boolean(&json!(true)), Coercion::Native(true));
        assert_eq!(coerce_boolean(&json!("YES")), Coercion::Converted(true));
        assert_eq!(coerce_boolean(&json!(" n ")), Coercion::Converted(false));
        assert_eq!(coerce_boolean(&json!(0)), Coercion::Converted(false));
        assert_eq!(coerce_boolean(&json!(2.5)), Coercion::Converted(true));
        assert_eq!(coerce_boolean(&json!("maybe")), Coercion::Invalid);
    }

    #[test]
    fn integers() {
        assert_eq!(coerce_integer(&json!(42)), Coercion::Native(42));
        assert_eq!(coerce_integer(&json!(42.0)), Coercion::Converted(42));
        assert_eq!(coerce_integer(&json!(" 17 ")), Coercion::Converted(17));
        assert_eq!(coerce_integer(&json!("17.0")), Coercion::Converted(17));
        assert_eq!(coerce_integer(&json!("17.5")), Coercion::Invalid);
        assert_eq!(coerce_integer(&json!("1.2.3")), Coercion::Invalid);
        assert_eq!(coerce_integer(&json!(true)), Coercion::Invalid);
    }

    #[test]
    fn floats_accept_comma_decimals() {
        assert_eq!(coerce_float(&json!(1.25)), Coercion::Native(1.25));
        assert_eq!(coerce_float(&json!(3)), Coercion::Converted(3.0));
        assert_eq!(coerce_float(&json!("12,5")), Coercion::Converted(12.5));
        assert_eq!(coerce_float(&json!("1 234,5")), Coercion::Converted(1234.5));
        assert_eq!(coerce_float(&json!("abc")), Coercion::Invalid);
        assert_eq!(coerce_float(&json!("1,2,3")), Coercion::Invalid);
    }

    #[test]
    fn percent_ratio() {
        assert_eq!(percent_to_ratio(1.25), 0.0125);
        assert_eq!(percent_to_ratio(0.2), 0.2);
        assert_eq!(percent_to_ratio(1.0), 1.0);
    }

    #[test]
    fn arrays() {
        assert_eq!(coerce_array(None), ArrayShape::Empty);
        assert_eq!(coerce_array(Some(&json!(""))), ArrayShape::Empty);
        assert_eq!(
            coerce_array(Some(&json!(190))),
            ArrayShape::Wrapped(vec![json!(190)])
        );
        assert_eq!(
            coerce_array(Some(&json!([1, 2]))).into_items(),
            vec![json!(1), json!(2)]
        );
    }
}
