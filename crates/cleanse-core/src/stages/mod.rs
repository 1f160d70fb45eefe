//! Stage implementations invoked by [`crate::pipeline`].

pub mod address;
pub mod coerce;
pub mod cross_field;
pub mod dates;
pub mod final_model;
pub mod identifiers;
pub mod normalize;
pub mod patches;
pub mod structure;

use cleanse_model::{Category, Observation};
use cleanse_validate::Finding;

/// Lifts a validator finding into an observation.
pub(crate) fn finding_observation(category: Category, finding: &Finding) -> Observation {
    Observation::new(category, finding.severity, finding.kind, finding.message.clone())
}
