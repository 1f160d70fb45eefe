//! French identifier validators.
//!
//! Every validator cleans first and checks second. The outcome carries the
//! cleaned value and the findings (repairs as info, failures as warning or
//! error) that the pipeline turns into observations.

pub mod contact;
pub mod luhn;
pub mod postal;
pub mod rna;
pub mod siren;
pub mod siret;
pub mod vat;

use cleanse_model::Severity;
use cleanse_standards::{DepartmentTable, IdentifierKind};

pub use luhn::{digit_sum, luhn_valid};

/// One repair or failure reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

impl Finding {
    pub fn info(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind,
            message: message.into(),
        }
    }

    pub fn warning(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }

    pub fn error(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }
}

/// Cleaned value plus findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub value: String,
    pub findings: Vec<Finding>,
}

impl Validated {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            findings: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// False when any finding is an error.
    pub fn is_valid(&self) -> bool {
        self.findings.iter().all(|f| f.severity != Severity::Error)
    }

    pub fn has(&self, kind: &str) -> bool {
        self.findings.iter().any(|f| f.kind == kind)
    }
}

/// Keeps ASCII digits only.
pub(crate) fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Runs the validator for `kind` on a raw value.
pub fn validate_identifier(
    kind: IdentifierKind,
    raw: &str,
    departments: &DepartmentTable,
) -> Validated {
    match kind {
        IdentifierKind::Siren => siren::validate_siren(raw),
        IdentifierKind::Siret => siret::validate_siret(raw),
        IdentifierKind::Vat => vat::validate_vat(raw),
        IdentifierKind::Rna => rna::validate_rna(raw),
        IdentifierKind::PostalCode => postal::validate_postal_code(raw, departments),
        IdentifierKind::Email => contact::validate_email(raw),
        IdentifierKind::Phone => contact::validate_phone(raw),
    }
}
