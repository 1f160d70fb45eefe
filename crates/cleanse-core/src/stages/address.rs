//! Address decomposition into component fields.

use anyhow::Result;
use cleanse_model::{Category, Observation, Record, RecordExt};
use cleanse_standards::AddressMapping;
use cleanse_standards::keywords::is_empty_sentinel;
use serde_json::{Map, Value};

use crate::address::{AddressParser, ParsedAddress, prune_house_number};
use crate::context::CleaningContext;
use crate::pipeline::PipelineState;

pub fn parse_addresses(
    records: &mut [Record],
    ctx: &CleaningContext,
    state: &mut PipelineState,
) -> Result<()> {
    let Some(mapping) = &ctx.schema.address else {
        return Ok(());
    };
    let parser = AddressParser::new(ctx.departments);
    for (row, record) in records.iter_mut().enumerate() {
        let id = ctx.entity_id(record);
        let observations = apply_address(record, mapping, &parser);
        state
            .errors
            .extend(observations.into_iter().map(|obs| obs.at(row, id)));
    }
    Ok(())
}

/// Parses the source line of one record and fills its empty components.
///
/// Placeholder values such as `0` or `-` count as empty. When the source
/// line doubles as the street field it is replaced by the parsed street.
pub(crate) fn apply_address(
    record: &mut Record,
    mapping: &AddressMapping,
    parser: &AddressParser,
) -> Vec<Observation> {
    let mut observations = clear_sentinels(record, mapping);

    let Some(line) = record.non_empty_text(&mapping.source).map(str::to_string) else {
        return observations;
    };
    let parsed = parser.parse(&line);
    if parsed.is_unparsed() {
        observations.push(
            Observation::warning(
                Category::Address,
                "address_unparsed",
                "no street, postal code or city could be extracted",
            )
            .with_field(mapping.source.as_str())
            .with_original(line.as_str()),
        );
        return observations;
    }

    let mut filled = Map::new();
    for (field, component) in components(mapping, &parsed) {
        if component.is_empty() {
            continue;
        }
        let replace_in_place = field == mapping.source && mapping.parses_in_place();
        let current = record.text(field).unwrap_or_default();
        if (record.is_blank_field(field) || replace_in_place) && current != component {
            record.replace(field, Value::String(component.to_string()));
            filled.insert(field.to_string(), Value::String(component.to_string()));
        }
    }
    if !filled.is_empty() {
        observations.push(
            Observation::info(
                Category::Address,
                "address_parsed",
                format!("address decomposed as {}", parsed.shape.as_str()),
            )
            .with_field(mapping.source.as_str())
            .with_change(line.as_str(), Value::Object(filled)),
        );
    }

    observations.extend(remove_redundancy(record, mapping));
    observations
}

fn components<'a>(
    mapping: &'a AddressMapping,
    parsed: &'a ParsedAddress,
) -> [(&'a str, &'a str); 5] {
    [
        (mapping.number.as_str(), parsed.number.as_str()),
        (mapping.street.as_str(), parsed.street.as_str()),
        (mapping.additional.as_str(), parsed.additional.as_str()),
        (mapping.postal_code.as_str(), parsed.postal_code.as_str()),
        (mapping.city.as_str(), parsed.city.as_str()),
    ]
}

fn clear_sentinels(record: &mut Record, mapping: &AddressMapping) -> Vec<Observation> {
    let mut observations = Vec::new();
    let fields = std::iter::once(mapping.source.as_str()).chain(mapping.components());
    for field in fields {
        let Some(text) = record.text(field) else {
            continue;
        };
        if !is_empty_sentinel(text.trim()) {
            continue;
        }
        let original = text.to_string();
        record.replace(field, Value::String(String::new()));
        observations.push(
            Observation::info(
                Category::Address,
                "address_empty_value",
                "placeholder value treated as empty",
            )
            .with_field(field)
            .with_change(original, ""),
        );
    }
    observations
}

/// Drops a complement that repeats the street or the house number.
fn remove_redundancy(record: &mut Record, mapping: &AddressMapping) -> Option<Observation> {
    let additional = record.non_empty_text(&mapping.additional)?.to_string();
    let street = record.non_empty_text(&mapping.street).unwrap_or_default();
    let number = record.non_empty_text(&mapping.number).unwrap_or_default();

    let pruned = if additional.eq_ignore_ascii_case(street) {
        String::new()
    } else {
        prune_house_number(&additional, number)?
    };
    record.replace(&mapping.additional, Value::String(pruned.clone()));
    Some(
        Observation::info(
            Category::Address,
            "address_redundancy_removed",
            "complement repeated the street or house number",
        )
        .with_field(mapping.additional.as_str())
        .with_change(additional, pruned),
    )
}
