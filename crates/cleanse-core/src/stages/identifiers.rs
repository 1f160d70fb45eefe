//! Identifier validation and repair.

use anyhow::Result;
use cleanse_model::{Category, Observation, Record, RecordExt};
use cleanse_standards::{FieldPatterns, IdentifierKind};
use cleanse_validate::{siren_from_siret, validate_identifier};
use serde_json::Value;

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;
use crate::stages::finding_observation;

/// Text form of an identifier value; numbers are accepted as digits.
pub(crate) fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn validate_identifiers(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let schema = ctx.schema;
    let patterns = FieldPatterns::compile(schema)?;
    let siren_field = schema.identifier_field(IdentifierKind::Siren);
    let siret_field = schema.identifier_field(IdentifierKind::Siret);

    for (row, record) in records.iter_mut().enumerate() {
        let id = ctx.entity_id(record);

        for (spec, kind) in schema.identifier_fields() {
            let Some(original) = record.get(&spec.name) else {
                continue;
            };
            let Some(raw) = identifier_text(original) else {
                continue;
            };
            let original = original.clone();
            let validated = validate_identifier(kind, &raw, ctx.departments);
            let cleaned = Value::String(validated.value.clone());
            for finding in &validated.findings {
                state.errors.push(
                    finding_observation(Category::Identifier, finding)
                        .at(row, id)
                        .with_field(spec.name.as_str())
                        .with_change(original.clone(), cleaned.clone()),
                );
            }
            if cleaned != original {
                record.replace(&spec.name, cleaned);
            }
        }

        if let (Some(siren), Some(siret)) = (siren_field, siret_field)
            && record.is_blank_field(&siren.name)
            && let Some(derived) = record
                .non_empty_text(&siret.name)
                .and_then(siren_from_siret)
        {
            state.errors.push(
                Observation::info(
                    Category::Identifier,
                    "siren_derived_from_siret",
                    format!("SIREN taken from the first nine digits of {}", siret.name),
                )
                .at(row, id)
                .with_field(siren.name.as_str())
                .with_new(derived.as_str()),
            );
            record.replace(&siren.name, Value::String(derived));
        }

        for (field, regex) in patterns.iter() {
            let Some(text) = record.non_empty_text(field) else {
                continue;
            };
            if !regex.is_match(text) {
                state.errors.push(
                    Observation::warning(
                        Category::Identifier,
                        "pattern_mismatch",
                        format!("value does not match {}", regex.as_str()),
                    )
                    .at(row, id)
                    .with_field(field)
                    .with_original(text),
                );
            }
        }
    }
    Ok(())
}
