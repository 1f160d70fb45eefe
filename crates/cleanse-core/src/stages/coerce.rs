//! Type coercion of scalar and array fields.

use anyhow::Result;
use cleanse_model::{Category, Observation, Record};
use cleanse_normalization::{
    ArrayShape, Coercion, coerce_array, coerce_boolean, coerce_float, coerce_integer, float_value,
    percent_to_ratio,
};
use cleanse_standards::{FieldSpec, FieldType};
use serde_json::Value;

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;

pub fn coerce_types(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let schema = ctx.schema;
    for (row, record) in records.iter_mut().enumerate() {
        let id = ctx.entity_id(record);
        for (key, value) in record.iter_mut() {
            let Some(spec) = schema.field_for_key(key) else {
                continue;
            };
            let observation = if schema.is_key_field(&spec.name) {
                check_key(spec, value)
            } else {
                coerce_field(spec, value, key != &spec.name)
            };
            if let Some(observation) = observation {
                state
                    .errors
                    .push(observation.at(row, id).with_field(key.as_str()));
            }
        }
    }
    Ok(())
}

/// Keys are validated but never rewritten.
pub(crate) fn check_key(spec: &FieldSpec, value: &Value) -> Option<Observation> {
    match value {
        Value::Null => None,
        Value::Number(number) if number.is_i64() || number.is_u64() => None,
        other => Some(
            Observation::error(
                Category::Types,
                "invalid_identifier_type",
                format!("{} must be an integer", spec.name),
            )
            .with_original(other.clone()),
        ),
    }
}

/// Coerces one value to its declared type.
///
/// `renamed` is set when the value was read under a rename source such as
/// `st_commission_%`; only those percent values are scaled to a ratio.
pub(crate) fn coerce_field(spec: &FieldSpec, value: &mut Value, renamed: bool) -> Option<Observation> {
    if value.is_null() {
        return None;
    }
    if spec.field_type.is_array() {
        return shape_array(value);
    }
    if spec.field_type != FieldType::Text && value.as_str().is_some_and(|s| s.trim().is_empty()) {
        *value = Value::Null;
        return None;
    }
    match spec.field_type {
        FieldType::Text => stringify(value),
        FieldType::Boolean => coerce_boolean_field(spec, value),
        FieldType::Integer => coerce_integer_field(value),
        FieldType::Float => coerce_float_field(value),
        FieldType::Percent if renamed => coerce_percent_field(value),
        FieldType::Percent => coerce_float_field(value),
        FieldType::Date | FieldType::IntegerArray | FieldType::TextArray => None,
    }
}

/// Numbers and booleans in text fields become their text form.
fn stringify(value: &mut Value) -> Option<Observation> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    let original = std::mem::replace(value, Value::String(text.clone()));
    Some(
        Observation::info(Category::Types, "value_conversion", "value converted to text")
            .with_change(original, text),
    )
}

fn coerce_boolean_field(spec: &FieldSpec, value: &mut Value) -> Option<Observation> {
    match coerce_boolean(value) {
        Coercion::Native(_) => None,
        Coercion::Converted(flag) => {
            let original = std::mem::replace(value, Value::Bool(flag));
            Some(
                Observation::info(Category::Types, "boolean_coerced", "value read as a boolean")
                    .with_change(original, flag),
            )
        }
        Coercion::Invalid => {
            let fallback = spec
                .default
                .as_ref()
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let original = std::mem::replace(value, Value::Bool(fallback));
            Some(
                Observation::warning(
                    Category::Types,
                    "invalid_boolean",
                    format!("value is not a boolean; set to {fallback}"),
                )
                .with_change(original, fallback),
            )
        }
    }
}

fn coerce_integer_field(value: &mut Value) -> Option<Observation> {
    match coerce_integer(value) {
        Coercion::Native(_) => None,
        Coercion::Converted(n) => {
            let original = std::mem::replace(value, Value::from(n));
            Some(
                Observation::info(Category::Types, "integer_coerced", "value read as an integer")
                    .with_change(original, n),
            )
        }
        Coercion::Invalid => {
            let original = std::mem::replace(value, Value::Null);
            Some(
                Observation::warning(Category::Types, "invalid_integer", "value is not an integer")
                    .with_original(original),
            )
        }
    }
}

fn invalid_float(value: &mut Value) -> Observation {
    let original = std::mem::replace(value, Value::Null);
    Observation::warning(Category::Types, "invalid_float", "value is not a number")
        .with_original(original)
}

fn coerce_float_field(value: &mut Value) -> Option<Observation> {
    match coerce_float(value) {
        Coercion::Native(_) => None,
        Coercion::Converted(n) => {
            let converted = float_value(n);
            let original = std::mem::replace(value, converted.clone());
            Some(
                Observation::info(Category::Types, "float_coerced", "value read as a number")
                    .with_change(original, converted),
            )
        }
        Coercion::Invalid => Some(invalid_float(value)),
    }
}

fn coerce_percent_field(value: &mut Value) -> Option<Observation> {
    let coercion = coerce_float(value);
    let converted = coercion.is_converted();
    let Some(n) = coercion.value() else {
        return Some(invalid_float(value));
    };
    let ratio = percent_to_ratio(n);
    if ratio == n && !converted {
        return None;
    }
    let shaped = float_value(ratio);
    let original = std::mem::replace(value, shaped.clone());
    let observation = if ratio == n {
        Observation::info(Category::Types, "float_coerced", "value read as a number")
    } else {
        Observation::info(
            Category::Types,
            "value_conversion",
            format!("percentage {n} converted to ratio {ratio}"),
        )
    };
    Some(observation.with_change(original, shaped))
}

fn shape_array(value: &mut Value) -> Option<Observation> {
    match coerce_array(Some(&*value)) {
        ArrayShape::Array(_) => None,
        ArrayShape::Empty => {
            *value = Value::Array(Vec::new());
            None
        }
        ArrayShape::Wrapped(items) => {
            let original = std::mem::replace(value, Value::Array(items));
            Some(
                Observation::info(
                    Category::Array,
                    "array_wrapped",
                    "scalar wrapped into a one-element array",
                )
                .with_change(original, value.clone()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn spec(field_type: FieldType) -> FieldSpec {
        FieldSpec {
            name: "x_field".to_string(),
            field_type,
            required: false,
            unique: false,
            max_length: None,
            default: None,
            case: Default::default(),
            punctuation: Default::default(),
            identifier: None,
            set_valued: false,
            pattern: None,
        }
    }

    #[test]
    fn percent_above_one_becomes_ratio() {
        let mut value = json!(1.25);
        let obs = coerce_field(&spec(FieldType::Percent), &mut value, true).unwrap();
        assert_eq!(value, json!(0.0125));
        assert_eq!(obs.kind, "value_conversion");
        assert_eq!(obs.original, Some(json!(1.25)));

        let mut ratio = json!(0.2);
        assert!(coerce_field(&spec(FieldType::Percent), &mut ratio, true).is_none());
    }

    #[test]
    fn ratio_field_is_never_rescaled() {
        let mut value = json!(2.5);
        assert!(coerce_field(&spec(FieldType::Percent), &mut value, false).is_none());
        assert_eq!(value, json!(2.5));

        let mut text = json!("2,5");
        let obs = coerce_field(&spec(FieldType::Percent), &mut text, false).unwrap();
        assert_eq!(text, json!(2.5));
        assert_eq!(obs.kind, "float_coerced");
    }

    #[test]
    fn invalid_boolean_takes_default() {
        let mut field = spec(FieldType::Boolean);
        field.default = Some(json!(true));
        let mut value = json!("peut-etre");
        let obs = coerce_field(&field, &mut value, false).unwrap();
        assert_eq!(value, json!(true));
        assert_eq!(obs.kind, "invalid_boolean");
    }

    #[test]
    fn blank_numbers_become_null_silently() {
        let mut value = json!("  ");
        assert!(coerce_field(&spec(FieldType::Integer), &mut value, false).is_none());
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn numeric_text_is_stringified() {
        let mut value = json!(33430);
        let obs = coerce_field(&spec(FieldType::Text), &mut value, false).unwrap();
        assert_eq!(value, json!("33430"));
        assert_eq!(obs.kind, "value_conversion");
    }

    #[test]
    fn scalar_array_is_wrapped() {
        let mut value = json!(190);
        let obs = coerce_field(&spec(FieldType::IntegerArray), &mut value, false).unwrap();
        assert_eq!(value, json!([190]));
        assert_eq!(obs.kind, "array_wrapped");
        assert_eq!(obs.new, Some(json!([190])));
    }

    #[test]
    fn keys_are_never_rewritten() {
        let key = spec(FieldType::Integer);
        assert!(check_key(&key, &json!(175)).is_none());
        let obs = check_key(&key, &json!("175")).unwrap();
        assert_eq!(obs.kind, "invalid_identifier_type");
    }
}
