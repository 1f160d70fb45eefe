//! Structured observations emitted by pipeline stages.
//!
//! An observation records one correction, warning, or remaining defect. The
//! `kind` is a short machine token (`invalid_siren_checksum`) and is
//! serialized as `type`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// Observation severity.
///
/// Ordered so that `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A normalization or repair was applied; the data is now valid.
    Info,
    /// The data remains usable but is questionable.
    Warning,
    /// The data violates a declared constraint.
    Error,
}

impl Severity {
    pub const fn all() -> &'static [Self] {
        &[Self::Error, Self::Warning, Self::Info]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(ModelError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Observation category. Each category becomes one report sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Structure,
    Required,
    Identifier,
    Address,
    Uniqueness,
    Types,
    Date,
    Array,
    Normalization,
    Length,
    Patch,
    General,
}

impl Category {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Structure,
            Self::Required,
            Self::Identifier,
            Self::Address,
            Self::Uniqueness,
            Self::Types,
            Self::Date,
            Self::Array,
            Self::Normalization,
            Self::Length,
            Self::Patch,
            Self::General,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Required => "required",
            Self::Identifier => "identifier",
            Self::Address => "address",
            Self::Uniqueness => "uniqueness",
            Self::Types => "types",
            Self::Date => "date",
            Self::Array => "array",
            Self::Normalization => "normalization",
            Self::Length => "length",
            Self::Patch => "patch",
            Self::General => "general",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Required => "Required Fields",
            Self::Identifier => "Identifiers",
            Self::Address => "Addresses",
            Self::Uniqueness => "Uniqueness",
            Self::Types => "Types",
            Self::Date => "Dates",
            Self::Array => "Arrays",
            Self::Normalization => "Normalization",
            Self::Length => "Length Caps",
            Self::Patch => "Patches",
            Self::General => "General",
        }
    }

    /// Categories whose observations are surfaced on the critical-fields sheet.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Uniqueness | Self::Required)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}

/// One structured diagnostic appended to the accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub category: Category,
    pub severity: Severity,
    /// Short machine token, e.g. `invalid_siren_checksum`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Primary-key value of the record, when it is a valid integer.
    pub entity_id: Option<i64>,
    /// Zero-based position of the record in the input array.
    pub row: Option<usize>,
    pub field: Option<String>,
    pub original: Option<Value>,
    pub new: Option<Value>,
    pub message: String,
}

impl Observation {
    pub fn new(
        category: Category,
        severity: Severity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            kind: kind.into(),
            entity_id: None,
            row: None,
            field: None,
            original: None,
            new: None,
            message: message.into(),
        }
    }

    pub fn info(category: Category, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Info, kind, message)
    }

    pub fn warning(
        category: Category,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(category, Severity::Warning, kind, message)
    }

    pub fn error(category: Category, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Error, kind, message)
    }

    /// Attach the record position and primary key.
    #[must_use]
    pub fn at(mut self, row: usize, entity_id: Option<i64>) -> Self {
        self.row = Some(row);
        self.entity_id = entity_id;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_original(mut self, original: impl Into<Value>) -> Self {
        self.original = Some(original.into());
        self
    }

    #[must_use]
    pub fn with_new(mut self, new: impl Into<Value>) -> Self {
        self.new = Some(new.into());
        self
    }

    /// Attach both the original and the new value.
    #[must_use]
    pub fn with_change(self, original: impl Into<Value>, new: impl Into<Value>) -> Self {
        self.with_original(original).with_new(new)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}/{}", self.severity, self.category, self.kind)?;
        if let Some(id) = self.entity_id {
            write!(f, " id={id}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " field={field}")?;
        }
        write!(f, ": {}", self.message)
    }
}
