//! Final output shape: renames, defaults, length caps, required fields and
//! per-record validation status.

use std::collections::BTreeMap;

use anyhow::Result;
use cleanse_model::{Category, ErrorAccumulator, Observation, Record, RecordExt, ValidationStatus};
use cleanse_standards::EntitySchema;
use serde_json::Value;

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;

/// Error reasons per record position: `(field, kind)`, with `None` for
/// record-level errors.
type RowFailures = BTreeMap<usize, Vec<(Option<String>, String)>>;

fn collect_failures(errors: &ErrorAccumulator, schema: &EntitySchema) -> RowFailures {
    let mut failures = RowFailures::new();
    for obs in errors.iter().filter(|obs| obs.is_error()) {
        let Some(row) = obs.row else {
            continue;
        };
        let field = obs
            .field
            .as_ref()
            .map(|field| schema.rename.get(field).unwrap_or(field).clone());
        failures
            .entry(row)
            .or_default()
            .push((field, obs.kind.clone()));
    }
    failures
}

pub fn shape_final_model(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let schema = ctx.schema;
    let mut failures = collect_failures(&state.errors, schema);
    state.statuses.clear();

    for (row, record) in records.iter_mut().enumerate() {
        let id = ctx.entity_id(record);
        let mut observations = Vec::new();

        apply_renames(record, schema);
        apply_defaults(record, schema);
        observations.extend(apply_length_caps(record, schema));
        observations.extend(check_required(record, schema));

        let row_failures = failures.entry(row).or_default();
        for obs in observations {
            let obs = obs.at(row, id);
            if obs.is_error() {
                row_failures.push((obs.field.clone(), obs.kind.clone()));
            }
            state.errors.push(obs);
        }

        let status = validation_status(schema, row_failures);
        let shaped = shape(record, schema, serde_json::to_value(&status)?);
        *record = shaped;
        state.statuses.push(status);
    }
    Ok(())
}

/// Moves renamed fields to their output name unless it already holds data.
fn apply_renames(record: &mut Record, schema: &EntitySchema) {
    for (from, to) in &schema.rename {
        if let Some(value) = record.remove(from)
            && record.is_blank_field(to)
        {
            record.replace(to, value);
        }
    }
}

/// Fills absent or null fields with their defaults; arrays default to `[]`.
fn apply_defaults(record: &mut Record, schema: &EntitySchema) {
    for spec in &schema.fields {
        if !record.get(&spec.name).is_none_or(Value::is_null) {
            continue;
        }
        if spec.field_type.is_array() {
            record.replace(&spec.name, Value::Array(Vec::new()));
        } else if let Some(default) = &spec.default {
            record.replace(&spec.name, default.clone());
        }
    }
}

fn apply_length_caps(record: &mut Record, schema: &EntitySchema) -> Vec<Observation> {
    let mut observations = Vec::new();
    for (field, cap) in schema.length_caps() {
        let Some(Value::String(text)) = record.get_mut(field) else {
            continue;
        };
        let length = text.chars().count();
        if length <= cap {
            continue;
        }
        let truncated: String = text.chars().take(cap).collect();
        let original = std::mem::replace(text, truncated.clone());
        observations.push(
            Observation::warning(
                Category::Length,
                "value_truncated",
                format!("value truncated from {length} to {cap} characters"),
            )
            .with_field(field)
            .with_change(original, truncated),
        );
    }
    observations
}

fn check_required(record: &Record, schema: &EntitySchema) -> Vec<Observation> {
    let mut observations: Vec<Observation> = schema
        .required_fields()
        .filter(|spec| record.is_blank_field(&spec.name))
        .map(|spec| {
            Observation::error(
                Category::Required,
                "missing_required_field",
                format!("{} is required", spec.name),
            )
            .with_field(spec.name.as_str())
        })
        .collect();

    if !schema.require_any_of.is_empty()
        && schema
            .require_any_of
            .iter()
            .all(|slot| record.is_blank_field(slot))
    {
        observations.push(Observation::error(
            Category::Required,
            "missing_foreign_key",
            format!("one of {} must be set", schema.require_any_of.join(", ")),
        ));
    }
    observations
}

fn validation_status(schema: &EntitySchema, failures: &[(Option<String>, String)]) -> ValidationStatus {
    let mut status = ValidationStatus::new();
    for (field, kind) in failures {
        match field {
            Some(field) if schema.has_field(field) => status.fail(field, kind.as_str()),
            _ if kind == "missing_foreign_key" => {
                for slot in &schema.require_any_of {
                    status.fail(slot, kind.as_str());
                }
            }
            _ => status.fail_record(kind.as_str()),
        }
    }
    for field in schema.output_fields() {
        status.pass(field);
    }
    status
}

/// Declared fields in schema order (absent ones as null), then the status.
fn shape(record: &mut Record, schema: &EntitySchema, status: Value) -> Record {
    let mut shaped = Record::new();
    for field in schema.output_fields() {
        let value = record.remove(field).unwrap_or(Value::Null);
        shaped.insert(field.to_string(), value);
    }
    shaped.insert(schema.validation_status_field.clone(), status);
    shaped
}

#[cfg(test)]
mod tests {
    use cleanse_model::EntityType;
    use cleanse_standards::Standards;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    #[test]
    fn renames_defaults_and_order() {
        let standards = Standards::load_from(None).unwrap();
        let schema = standards.schema(EntityType::Stocks).unwrap();
        let ctx = CleaningContext::new(schema, standards.departments());
        let mut records = vec![record(json!({
            "st_commission_%": 0.0125,
            "st_id": 4,
            "extra": "dropped",
        }))];
        let mut state = PipelineState::new();
        shape_final_model(&mut records, &ctx, &mut state).unwrap();

        let rec = &records[0];
        assert_eq!(rec["st_commission_percent"], json!(0.0125));
        assert!(rec.get("st_commission_%").is_none());
        assert!(rec.get("extra").is_none());
        let keys: Vec<&str> = rec.keys().map(String::as_str).collect();
        let mut expected: Vec<&str> = schema.output_fields().collect();
        expected.push("st_validation_status");
        assert_eq!(keys, expected);
    }

    #[test]
    fn caps_and_required_fields_drive_status() {
        let standards = Standards::load_from(None).unwrap();
        let schema = standards.schema(EntityType::Companies).unwrap();
        let ctx = CleaningContext::new(schema, standards.departments());
        let mut records = vec![record(json!({
            "co_id": 175,
            "co_business_name": "",
            "co_legal_form": "X".repeat(120),
            "fk_us": 0,
        }))];
        let mut state = PipelineState::new();
        shape_final_model(&mut records, &ctx, &mut state).unwrap();

        let rec = &records[0];
        assert_eq!(rec.text("co_legal_form").map(|s| s.chars().count()), Some(100));
        assert_eq!(rec["co_head_office_country"], "FRANCE");
        let status = &state.statuses[0];
        assert!(!status.is_valid);
        assert_eq!(status.failed_fields().collect::<Vec<_>>(), vec!["co_business_name"]);
        let missing: Vec<_> = state.errors.of_kind("missing_required_field").collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].entity_id, Some(175));
        assert_eq!(missing[0].field.as_deref(), Some("co_business_name"));
        assert_eq!(state.errors.of_kind("value_truncated").count(), 1);
    }

    #[test]
    fn logistic_addresses_need_one_owner() {
        let standards = Standards::load_from(None).unwrap();
        let schema = standards.schema(EntityType::LogisticAddresses).unwrap();
        let ctx = CleaningContext::new(schema, standards.departments());
        let mut records = vec![record(json!({
            "la_id": 1,
            "la_street": "RUE HAUTE",
            "la_postal_code": "33000",
            "la_city": "BORDEAUX",
            "fk_us": 2,
        }))];
        let mut state = PipelineState::new();
        shape_final_model(&mut records, &ctx, &mut state).unwrap();

        assert_eq!(state.errors.of_kind("missing_foreign_key").count(), 1);
        let status = &state.statuses[0];
        assert_eq!(status.field_status.get("fk_co"), Some(&false));
        assert_eq!(status.field_status.get("fk_org"), Some(&false));
    }
}
