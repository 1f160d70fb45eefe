//! Per-record validation summary computed by the final-model stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Derived structure summarizing whether required and constrained fields
/// hold. Used for reporting only and stripped before the cleaned file is
/// written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatus {
    pub is_valid: bool,
    pub field_status: BTreeMap<String, bool>,
    pub error_details: Vec<FieldError>,
}

impl ValidationStatus {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    pub fn pass(&mut self, field: &str) {
        self.field_status.entry(field.to_string()).or_insert(true);
    }

    pub fn fail(&mut self, field: &str, reason: impl Into<String>) {
        self.is_valid = false;
        self.field_status.insert(field.to_string(), false);
        self.error_details.push(FieldError {
            field: field.to_string(),
            reason: reason.into(),
        });
    }

    /// Marks the whole record invalid for a reason not tied to one field.
    pub fn fail_record(&mut self, reason: impl Into<String>) {
        self.is_valid = false;
        self.error_details.push(FieldError {
            field: String::new(),
            reason: reason.into(),
        });
    }

    pub fn failed_fields(&self) -> impl Iterator<Item = &str> {
        self.field_status
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(field, _)| field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_sticky() {
        let mut status = ValidationStatus::new();
        status.pass("co_id");
        status.fail("co_siren", "invalid_siren_checksum");
        status.pass("co_siren");
        assert!(!status.is_valid);
        assert_eq!(status.field_status.get("co_siren"), Some(&false));
        assert_eq!(status.failed_fields().collect::<Vec<_>>(), vec!["co_siren"]);
        assert_eq!(status.error_details.len(), 1);
    }

    #[test]
    fn record_level_failure_has_no_field() {
        let mut status = ValidationStatus::new();
        status.pass("la_id");
        status.fail_record("missing_foreign_key");
        assert!(!status.is_valid);
        assert_eq!(status.failed_fields().count(), 0);
        assert_eq!(status.error_details[0].field, "");
    }
}
