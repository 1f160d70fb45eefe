//! Patch overlays.
//!
//! Key-joined patch sources declared by the schema fill empty fields of the
//! records whose key matches; the targeted `<entity>_patches.json` file then
//! overwrites fields of records identified by primary key. Within one run a
//! later patch value for the same record and field wins over an earlier one
//! and is reported as `conflicting_patch`. Patch values are cleaned and
//! validated like input values before they are written.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use cleanse_ingest::{PatchFile, read_patch_file};
use cleanse_model::{Category, Observation, Record, RecordExt, is_blank};
use cleanse_normalization::normalize_text;
use cleanse_standards::{FieldType, JoinedPatchSource};
use cleanse_validate::validate_identifier;
use serde_json::{Map, Value};
use tracing::debug;

use crate::address::AddressParser;
use crate::context::CleaningContext;
use crate::pipeline::PipelineState;
use crate::stages::address::apply_address;
use crate::stages::coerce::{check_key, coerce_field};
use crate::stages::dates::normalize_date_value;
use crate::stages::finding_observation;
use crate::stages::identifiers::identifier_text;

pub fn apply_patches(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let Some(dir) = ctx.patches_dir else {
        return Ok(());
    };
    let schema = ctx.schema;

    let mut filled: BTreeMap<(usize, String), Value> = BTreeMap::new();
    for source in &schema.patches {
        if let Some(file) = load(dir, &source.file, state) {
            apply_joined(records, ctx, source, &file, &mut filled, state);
        }
    }
    if let Some(mapping) = &schema.address {
        let parser = AddressParser::new(ctx.departments);
        for (row, _) in filled.keys().filter(|(_, field)| *field == mapping.source) {
            let record = &mut records[*row];
            let id = ctx.entity_id(record);
            let observations = apply_address(record, mapping, &parser);
            state
                .errors
                .extend(observations.into_iter().map(|obs| obs.at(*row, id)));
        }
    }

    let targeted = format!("{}_patches.json", schema.entity.as_str());
    if let Some(file) = load(dir, &targeted, state) {
        apply_targeted(records, ctx, &file, state);
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load(dir: &Path, name: &str, state: &mut PipelineState) -> Option<PatchFile> {
    match read_patch_file(&dir.join(name)) {
        Ok(Some(file)) => Some(file),
        Ok(None) => {
            state.errors.push(Observation::info(
                Category::Patch,
                "patch_file_missing",
                format!("patch file {name} not found; skipped"),
            ));
            None
        }
        Err(error) => {
            state.errors.push(Observation::error(
                Category::Patch,
                "patch_parse_error",
                error.to_string(),
            ));
            None
        }
    }
}

/// Cleans a patch value the way the pipeline cleaned the field.
///
/// Returned observations carry the field but no position.
fn clean_patch_value(ctx: &CleaningContext, field: &str, raw: &Value) -> (Value, Vec<Observation>) {
    let schema = ctx.schema;
    let Some(spec) = schema.field_for_key(field) else {
        return (raw.clone(), Vec::new());
    };
    if let (Some(kind), Some(text)) = (spec.identifier, identifier_text(raw)) {
        let validated = validate_identifier(kind, &text, ctx.departments);
        let observations = validated
            .findings
            .iter()
            .map(|finding| {
                finding_observation(Category::Identifier, finding)
                    .with_field(field)
                    .with_change(raw.clone(), validated.value.as_str())
            })
            .collect();
        return (Value::String(validated.value), observations);
    }

    let mut value = raw.clone();
    let observation = if schema.is_key_field(&spec.name) {
        check_key(spec, &value)
    } else if spec.field_type == FieldType::Date {
        normalize_date_value(&mut value)
    } else {
        if spec.is_normalizable_text()
            && let Value::String(text) = &value
        {
            let normalized = normalize_text(text, ctx.effective_case(spec.case), spec.punctuation);
            value = Value::String(normalized.value);
        }
        coerce_field(spec, &mut value, field != spec.name)
    };
    let observations = observation
        .into_iter()
        .map(|obs| obs.with_field(field))
        .collect();
    (value, observations)
}

fn apply_joined(
    records: &mut [Record],
    ctx: &CleaningContext,
    source: &JoinedPatchSource,
    file: &PatchFile,
    filled: &mut BTreeMap<(usize, String), Value>,
    state: &mut PipelineState,
) {
    let name = file_name(&file.path);
    let key_kind = ctx.schema.field(&source.key).and_then(|spec| spec.identifier);
    let clean_key = |raw: &str| match key_kind {
        Some(kind) => validate_identifier(kind, raw, ctx.departments).value,
        None => raw.trim().to_uppercase(),
    };

    let mut rows_by_key: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (row, record) in records.iter().enumerate() {
        if let Some(key) = record.get(&source.key).and_then(identifier_text) {
            rows_by_key.entry(clean_key(&key)).or_default().push(row);
        }
    }

    let mut matched = 0usize;
    for (index, entry) in file.entries.iter().enumerate() {
        let Some(key) = entry
            .as_object()
            .and_then(|object| object.get(&source.key))
            .and_then(identifier_text)
        else {
            state.errors.push(Observation::error(
                Category::Patch,
                "patch_parse_error",
                format!("entry {index} of {name} has no {}", source.key),
            ));
            continue;
        };
        let Some(rows) = rows_by_key.get(&clean_key(&key)) else {
            continue;
        };
        matched += 1;

        for field in &source.fields {
            let Some(raw) = entry.get(field).filter(|value| !is_blank(value)) else {
                continue;
            };
            let (value, findings) = clean_patch_value(ctx, field, raw);
            for &row in rows {
                let id = ctx.entity_id(&records[row]);
                let slot = (row, field.clone());
                let observation = match filled.get(&slot) {
                    Some(previous) if *previous == value => continue,
                    Some(previous) => Observation::warning(
                        Category::Patch,
                        "conflicting_patch",
                        format!("entry {index} of {name} overrides an earlier patch value"),
                    )
                    .with_change(previous.clone(), value.clone()),
                    None if !records[row].is_blank_field(field) => continue,
                    None => Observation::info(
                        Category::Patch,
                        "patch_filled",
                        format!("empty field filled from {name}"),
                    )
                    .with_new(value.clone()),
                };
                state
                    .errors
                    .push(observation.at(row, id).with_field(field.as_str()));
                state
                    .errors
                    .extend(findings.iter().cloned().map(|obs| obs.at(row, id)));
                records[row].replace(field, value.clone());
                filled.insert(slot, value.clone());
            }
        }
    }
    debug!(
        file = %name,
        entries = file.entries.len(),
        matched,
        "joined patches applied"
    );
}

fn targeted_entry<'a>(entry: &'a Value, pk: &str) -> Option<(i64, &'a Map<String, Value>)> {
    let object = entry.as_object()?;
    let id = object.get(pk)?.as_i64()?;
    let patches = object.get("patches")?.as_object()?;
    Some((id, patches))
}

fn apply_targeted(
    records: &mut [Record],
    ctx: &CleaningContext,
    file: &PatchFile,
    state: &mut PipelineState,
) {
    let schema = ctx.schema;
    let pk = schema.primary_key.as_str();
    let name = file_name(&file.path);

    let mut rows: BTreeMap<i64, usize> = BTreeMap::new();
    for (row, record) in records.iter().enumerate() {
        if let Some(id) = record.integer(pk) {
            rows.entry(id).or_insert(row);
        }
    }

    let mut applied: BTreeMap<(i64, &str), Value> = BTreeMap::new();
    let mut readdressed: Vec<usize> = Vec::new();
    for (index, entry) in file.entries.iter().enumerate() {
        let Some((id, patches)) = targeted_entry(entry, pk) else {
            state.errors.push(Observation::error(
                Category::Patch,
                "patch_parse_error",
                format!("entry {index} of {name} needs an integer {pk} and a patches object"),
            ));
            continue;
        };
        let Some(&row) = rows.get(&id) else {
            state.errors.push(
                Observation::warning(
                    Category::Patch,
                    "patch_target_missing",
                    format!("entry {index} of {name} targets {pk} {id}, which does not exist"),
                )
                .with_field(pk)
                .with_original(id),
            );
            continue;
        };

        for (field, raw) in patches {
            let patchable = field != pk
                && *field != schema.validation_status_field
                && schema.is_known_key(field);
            if !patchable {
                state.errors.push(
                    Observation::warning(
                        Category::Patch,
                        "patch_unknown_field",
                        format!("entry {index} of {name} patches {field}, which cannot be patched"),
                    )
                    .at(row, Some(id))
                    .with_field(field.as_str()),
                );
                continue;
            }
            let (value, findings) = clean_patch_value(ctx, field, raw);
            state
                .errors
                .extend(findings.into_iter().map(|obs| obs.at(row, Some(id))));
            if let Some(previous) = applied.insert((id, field.as_str()), value.clone())
                && previous != value
            {
                state.errors.push(
                    Observation::warning(
                        Category::Patch,
                        "conflicting_patch",
                        format!("entry {index} of {name} overrides an earlier patch value"),
                    )
                    .at(row, Some(id))
                    .with_field(field.as_str())
                    .with_change(previous, value.clone()),
                );
            }
            let record = &mut records[row];
            let old = record.get(field).cloned().unwrap_or(Value::Null);
            if old != value {
                if schema
                    .address
                    .as_ref()
                    .is_some_and(|mapping| *field == mapping.source)
                    && !readdressed.contains(&row)
                {
                    readdressed.push(row);
                }
                record.replace(field, value.clone());
                state.errors.push(
                    Observation::info(
                        Category::Patch,
                        "patch_applied",
                        format!("field patched from {name}"),
                    )
                    .at(row, Some(id))
                    .with_field(field.as_str())
                    .with_change(old, value),
                );
            }
        }
    }

    if let Some(mapping) = &schema.address {
        let parser = AddressParser::new(ctx.departments);
        for row in readdressed {
            let record = &mut records[row];
            let id = ctx.entity_id(record);
            let observations = apply_address(record, mapping, &parser);
            state
                .errors
                .extend(observations.into_iter().map(|obs| obs.at(row, id)));
        }
    }
}
