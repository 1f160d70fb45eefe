//! Text normalization of free-text fields.

use anyhow::Result;
use cleanse_model::{Category, Observation, Record};
use cleanse_normalization::{TextPass, normalize_text};
use serde_json::Value;

use crate::context::CleaningContext;
use crate::pipeline::PipelineState;

fn describe(pass: TextPass) -> &'static str {
    match pass {
        TextPass::Whitespace => "whitespace trimmed and collapsed",
        TextPass::SpecialCharacters => "accents and typographic characters replaced",
        TextPass::Punctuation => "stray punctuation removed",
    }
}

pub fn normalize_text_fields(
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
            if !spec.is_normalizable_text() {
                continue;
            }
            let Value::String(text) = value else {
                continue;
            };
            let normalized = normalize_text(text, ctx.effective_case(spec.case), spec.punctuation);
            if normalized.changes.is_empty() {
                continue;
            }
            for change in normalized.changes {
                state.errors.push(
                    Observation::info(
                        Category::Normalization,
                        change.pass.observation_type(),
                        describe(change.pass),
                    )
                    .at(row, id)
                    .with_field(key.as_str())
                    .with_change(change.before, change.after),
                );
            }
            *text = normalized.value;
        }
    }
    Ok(())
}
