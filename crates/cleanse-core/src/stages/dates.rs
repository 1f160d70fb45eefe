//! Date normalization to ISO `YYYY-MM-DD`.

use anyhow::Result;
use cleanse_model::{Category, Observation, Record, is_blank};
use cleanse_normalization::{DateOutcome, normalize_date};
use serde_json::Value;

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;

pub fn normalize_dates(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let schema = ctx.schema;
    for (row, record) in records.iter_mut().enumerate() {
        let id = ctx.entity_id(record);
        for spec in schema.date_fields() {
            let Some(value) = record.get_mut(&spec.name) else {
                continue;
            };
            if let Some(observation) = normalize_date_value(value) {
                state.errors.push(
                    observation
                        .at(row, id)
                        .with_field(spec.name.as_str()),
                );
            }
        }
    }
    Ok(())
}

/// Rewrites one date value as ISO; unparseable dates are cleared.
pub(crate) fn normalize_date_value(value: &mut Value) -> Option<Observation> {
    if is_blank(value) {
        return None;
    }
    match normalize_date(value) {
        DateOutcome::Unchanged(_) => None,
        DateOutcome::Normalized(iso) => {
            let original = std::mem::replace(value, Value::String(iso.clone()));
            Some(
                Observation::info(Category::Date, "date_normalized", "date rewritten as ISO")
                    .with_change(original, iso),
            )
        }
        DateOutcome::Invalid => {
            let original = std::mem::replace(value, Value::Null);
            Some(
                Observation::warning(
                    Category::Date,
                    "invalid_date",
                    "date could not be parsed; field left empty",
                )
                .with_original(original),
            )
        }
    }
}
