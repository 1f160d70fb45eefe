//! JSON error report.

use std::collections::BTreeMap;

use cleanse_model::{Category, EntityType, ErrorAccumulator, Observation, SeverityCounts};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    entity: EntityType,
    record_count: usize,
    counts: SeverityCounts,
    by_category: BTreeMap<Category, CategorySection<'a>>,
}

#[derive(Serialize)]
struct CategorySection<'a> {
    counts: SeverityCounts,
    observations: &'a [Observation],
}

/// Renders the accumulator as a JSON document grouped by category.
pub fn render_json_report(
    entity: EntityType,
    record_count: usize,
    errors: &ErrorAccumulator,
) -> serde_json::Result<Vec<u8>> {
    let mut by_category = BTreeMap::new();
    let counts = errors.counts_by_category();
    for (category, observations) in errors.categories() {
        by_category.insert(
            category,
            CategorySection {
                counts: counts.get(&category).copied().unwrap_or_default(),
                observations,
            },
        );
    }
    let report = JsonReport {
        entity,
        record_count,
        counts: errors.counts(),
        by_category,
    };
    let mut bytes = serde_json::to_vec_pretty(&report)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use cleanse_model::Severity;
    use serde_json::Value;

    use super::*;

    #[test]
    fn groups_observations_by_category() {
        let mut errors = ErrorAccumulator::new();
        errors.push(
            Observation::error(Category::Uniqueness, "duplicate_denomination", "dup")
                .at(1, Some(3))
                .with_field("tra_denomination"),
        );
        errors.push(Observation::new(
            Category::Array,
            Severity::Info,
            "array_deduplicated",
            "1 repeated element(s) removed",
        ));

        let bytes = render_json_report(EntityType::Transports, 2, &errors).unwrap();
        let report: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report["entity"], "transports");
        assert_eq!(report["counts"]["error"], 1);
        assert_eq!(report["by_category"]["uniqueness"]["counts"]["error"], 1);
        let obs = &report["by_category"]["uniqueness"]["observations"][0];
        assert_eq!(obs["type"], "duplicate_denomination");
        assert_eq!(obs["entity_id"], 3);
        assert_eq!(report["by_category"]["array"]["observations"][0]["severity"], "info");
    }
}
