//! Structural validation: JSON shape, primary keys, unknown fields.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use cleanse_model::{Category, Observation, Record, RecordExt};

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;

pub fn validate_structure(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let schema = ctx.schema;
    let pk = schema.primary_key.as_str();

    if let Some(key) = ctx.input_wrapper {
        state.errors.push(Observation::warning(
            Category::Structure,
            "wrapped_input_array",
            format!("input array was read from the `{key}` member of a wrapping object"),
        ));
    }

    let mut first_rows: BTreeMap<i64, usize> = BTreeMap::new();
    let mut reported_unknown: BTreeSet<&str> = BTreeSet::new();
    for (row, record) in records.iter().enumerate() {
        if state.non_object_rows.contains(&row) {
            state.errors.push(
                Observation::error(
                    Category::Structure,
                    "record_not_object",
                    format!("record at position {row} is not a JSON object"),
                )
                .at(row, None),
            );
            continue;
        }

        let id = ctx.entity_id(record);
        if record.is_blank_field(pk) {
            state.errors.push(
                Observation::error(
                    Category::Structure,
                    "missing_primary_key",
                    format!("record at position {row} has no {pk}"),
                )
                .at(row, None)
                .with_field(pk),
            );
        } else if let Some(id) = id {
            if let Some(first_row) = first_rows.get(&id) {
                state.errors.push(
                    Observation::error(
                        Category::Structure,
                        "duplicate_primary_key",
                        format!("{pk} {id} already used by the record at position {first_row}"),
                    )
                    .at(row, Some(id))
                    .with_field(pk),
                );
            } else {
                first_rows.insert(id, row);
            }
        }

        for key in record.keys() {
            if !schema.is_known_key(key) && reported_unknown.insert(key.as_str()) {
                state.errors.push(
                    Observation::info(
                        Category::Structure,
                        "unknown_field",
                        format!("{key} is not part of the {} model and is not emitted", schema.label),
                    )
                    .at(row, id)
                    .with_field(key.as_str()),
                );
            }
        }
    }
    Ok(())
}
