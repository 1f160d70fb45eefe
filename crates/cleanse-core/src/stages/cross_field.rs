//! Cross-field checks: identifier consistency, uniqueness and set-valued
//! array deduplication.

use anyhow::Result;
use cleanse_model::{Category, Observation, Record, RecordExt, display_value};
use cleanse_standards::{FieldType, IdentifierKind};
use cleanse_validate::{
    Finding, check_siret_siren, check_vat_siren, dedup_integer_array, dedup_text_array,
    find_duplicates,
};
use serde_json::Value;

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;
use crate::stages::finding_observation;

pub fn validate_cross_field(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    check_identifier_consistency(records, ctx, state);
    check_uniqueness(records, ctx, state);
    deduplicate_arrays(records, ctx, state);
    Ok(())
}

type ConsistencyCheck = fn(&str, &str) -> Option<Finding>;

fn check_identifier_consistency(
    records: &[Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) {
    let schema = ctx.schema;
    let Some(siren_field) = schema.identifier_field(IdentifierKind::Siren) else {
        return;
    };
    let siret_field = schema.identifier_field(IdentifierKind::Siret);
    let vat_field = schema.identifier_field(IdentifierKind::Vat);

    for (row, record) in records.iter().enumerate() {
        let Some(siren) = record.non_empty_text(&siren_field.name) else {
            continue;
        };
        let id = ctx.entity_id(record);
        let checks: [Option<(_, ConsistencyCheck)>; 2] = [
            siret_field.map(|field| (field, check_siret_siren as ConsistencyCheck)),
            vat_field.map(|field| (field, check_vat_siren as ConsistencyCheck)),
        ];
        for (field, check) in checks.into_iter().flatten() {
            let Some(value) = record.non_empty_text(&field.name) else {
                continue;
            };
            if let Some(finding) = check(siren, value) {
                state.errors.push(
                    finding_observation(Category::Identifier, &finding)
                        .at(row, id)
                        .with_field(field.name.as_str())
                        .with_original(value),
                );
            }
        }
    }
}

fn check_uniqueness(records: &[Record], ctx: &CleaningContext, state: &mut PipelineState) {
    let schema = ctx.schema;
    for spec in schema.unique_fields() {
        let values = records
            .iter()
            .enumerate()
            .filter_map(|(row, record)| record.get(&spec.name).map(|value| (row, value)));
        let kind = format!("duplicate_{}", schema.unprefixed(&spec.name));
        for duplicate in find_duplicates(values) {
            let first_id = ctx.entity_id(&records[duplicate.first_row]);
            let first = first_id.map_or_else(
                || format!("the record at position {}", duplicate.first_row),
                |id| format!("{} {id}", schema.primary_key),
            );
            state.errors.push(
                Observation::error(
                    Category::Uniqueness,
                    kind.as_str(),
                    format!(
                        "{} `{}` is already used by {first}",
                        spec.name,
                        display_value(&duplicate.value)
                    ),
                )
                .at(duplicate.row, ctx.entity_id(&records[duplicate.row]))
                .with_field(spec.name.as_str())
                .with_original(duplicate.value),
            );
        }
    }
}

fn deduplicate_arrays(records: &mut [Record], ctx: &CleaningContext, state: &mut PipelineState) {
    let schema = ctx.schema;
    let set_fields: Vec<_> = schema.array_fields().filter(|spec| spec.set_valued).collect();
    if set_fields.is_empty() {
        return;
    }
    for (row, record) in records.iter_mut().enumerate() {
        let id = ctx.entity_id(record);
        for spec in &set_fields {
            let Some(Value::Array(items)) = record.get_mut(&spec.name) else {
                continue;
            };
            let dedup = match spec.field_type {
                FieldType::IntegerArray => dedup_integer_array(items),
                _ => dedup_text_array(items),
            };
            if !dedup.invalid.is_empty() {
                state.errors.push(
                    Observation::warning(
                        Category::Array,
                        "invalid_array_element",
                        format!("{} element(s) dropped", dedup.invalid.len()),
                    )
                    .at(row, id)
                    .with_field(spec.name.as_str())
                    .with_original(Value::Array(dedup.invalid.clone())),
                );
            }
            if dedup.removed > 0 {
                state.errors.push(
                    Observation::info(
                        Category::Array,
                        "array_deduplicated",
                        format!("{} repeated element(s) removed", dedup.removed),
                    )
                    .at(row, id)
                    .with_field(spec.name.as_str())
                    .with_change(Value::Array(items.clone()), Value::Array(dedup.items.clone())),
                );
            }
            if *items != dedup.items {
                *items = dedup.items;
            }
        }
    }
}
