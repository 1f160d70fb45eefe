//! Category-indexed, append-only observation log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::observation::{Category, Observation, Severity};

/// Per-severity counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.info += 1,
            Severity::Warning => self.warning += 1,
            Severity::Error => self.error += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.warning + self.error
    }
}

/// Collects observations by category for one pipeline run.
///
/// The accumulator is the only channel through which stages report
/// diagnostics. Observations cannot be removed or edited once appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorAccumulator {
    categories: BTreeMap<Category, Vec<Observation>>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observation: Observation) {
        self.categories
            .entry(observation.category)
            .or_default()
            .push(observation);
    }

    pub fn extend(&mut self, observations: impl IntoIterator<Item = Observation>) {
        for observation in observations {
            self.push(observation);
        }
    }

    /// Observations of one category, in append order.
    pub fn category(&self, category: Category) -> &[Observation] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Non-empty categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[Observation])> {
        self.categories
            .iter()
            .filter(|(_, observations)| !observations.is_empty())
            .map(|(category, observations)| (*category, observations.as_slice()))
    }

    /// All observations, grouped by category.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.categories.values().flatten()
    }

    /// Observations attached to the record at `row`.
    pub fn for_row(&self, row: usize) -> impl Iterator<Item = &Observation> {
        self.iter().filter(move |obs| obs.row == Some(row))
    }

    /// Observations of the given machine type.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.iter().filter(move |obs| obs.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for obs in self.iter() {
            counts.add(obs.severity);
        }
        counts
    }

    pub fn counts_by_category(&self) -> BTreeMap<Category, SeverityCounts> {
        let mut counts: BTreeMap<Category, SeverityCounts> = BTreeMap::new();
        for obs in self.iter() {
            counts.entry(obs.category).or_default().add(obs.severity);
        }
        counts
    }

    /// Observation counts per machine type, most frequent first.
    pub fn counts_by_kind(&self) -> Vec<(String, Severity, usize)> {
        let mut counts: BTreeMap<(&str, Severity), usize> = BTreeMap::new();
        for obs in self.iter() {
            *counts.entry((obs.kind.as_str(), obs.severity)).or_insert(0) += 1;
        }
        let mut ranked: Vec<(String, Severity, usize)> = counts
            .into_iter()
            .map(|((kind, severity), count)| (kind.to_string(), severity, count))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(Observation::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ErrorAccumulator {
        let mut errors = ErrorAccumulator::new();
        errors.push(Observation::info(Category::Identifier, "rna_cleaning", "uppercased").at(0, Some(1)));
        errors.push(
            Observation::error(Category::Uniqueness, "duplicate_denomination", "dup").at(1, Some(3)),
        );
        errors.push(Observation::info(Category::Identifier, "rna_cleaning", "uppercased").at(1, Some(3)));
        errors
    }

    #[test]
    fn groups_by_category_in_append_order() {
        let errors = sample();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.category(Category::Identifier).len(), 2);
        assert!(errors.category(Category::Date).is_empty());
        let categories: Vec<Category> = errors.categories().map(|(c, _)| c).collect();
        assert_eq!(categories, vec![Category::Identifier, Category::Uniqueness]);
    }

    #[test]
    fn counts_and_row_lookup() {
        let errors = sample();
        let counts = errors.counts();
        assert_eq!(counts.info, 2);
        assert_eq!(counts.error, 1);
        assert!(errors.has_errors());
        assert_eq!(errors.for_row(1).count(), 2);
        assert_eq!(errors.of_kind("rna_cleaning").count(), 2);
    }

    #[test]
    fn kind_ranking_is_stable() {
        let ranked = sample().counts_by_kind();
        assert_eq!(ranked[0], ("rna_cleaning".to_string(), Severity::Info, 2));
        assert_eq!(ranked[1].0, "duplicate_denomination");
    }
}
