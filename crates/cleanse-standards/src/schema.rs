//! Entity schema documents.
//!
//! A schema declares the output shape of one entity type: ordered fields
//! with their nominal types, caps, defaults and validation rules, plus the
//! rename map, address layout and key-joined patch sources. The pipeline is
//! parametric over these declarations.

use std::collections::{BTreeMap, BTreeSet};

use cleanse_model::EntityType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StandardsError;

/// Nominal field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    /// Float holding a ratio; values above 1 are read as percentages.
    Percent,
    Boolean,
    /// ISO `YYYY-MM-DD` text.
    Date,
    IntegerArray,
    TextArray,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Percent => "percent",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::IntegerArray => "integer_array",
            Self::TextArray => "text_array",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::IntegerArray | Self::TextArray)
    }
}

/// Case applied by the whitespace normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    #[default]
    Upper,
    Lower,
    Preserve,
}

/// Punctuation-cleaning rule for a text field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationRule {
    /// Business names: strips `.,;:!?"()` outside protected abbreviations.
    Name,
    /// Street lines: like `Name` but commas survive.
    Address,
    /// Free text: only quotes and brackets are removed.
    FreeText,
    #[default]
    None,
}

/// Identifier validator attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Siren,
    Siret,
    Vat,
    Rna,
    PostalCode,
    Email,
    Phone,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Siren => "siren",
            Self::Siret => "siret",
            Self::Vat => "vat",
            Self::Rna => "rna",
            Self::PostalCode => "postal_code",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// One declared output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub case: TextCase,
    #[serde(default)]
    pub punctuation: PunctuationRule,
    #[serde(default)]
    pub identifier: Option<IdentifierKind>,
    /// Array elements are deduplicated, keeping first occurrences.
    #[serde(default)]
    pub set_valued: bool,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl FieldSpec {
    pub fn is_text(&self) -> bool {
        self.field_type == FieldType::Text
    }

    /// Free text the normalizers may rewrite. Identifier fields are left to
    /// their validators.
    pub fn is_normalizable_text(&self) -> bool {
        self.is_text() && self.identifier.is_none()
    }
}

/// Fields the address parser reads and fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMapping {
    /// Field holding the free-form address line.
    pub source: String,
    pub number: String,
    pub street: String,
    pub additional: String,
    pub postal_code: String,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl AddressMapping {
    /// Component fields, excluding the source line.
    pub fn components(&self) -> Vec<&str> {
        let mut fields = vec![
            self.number.as_str(),
            self.street.as_str(),
            self.additional.as_str(),
            self.postal_code.as_str(),
            self.city.as_str(),
        ];
        if let Some(country) = &self.country {
            fields.push(country.as_str());
        }
        fields
    }

    /// True when the free-form line is also the street component.
    pub fn parses_in_place(&self) -> bool {
        self.source == self.street
    }
}

/// A key-joined patch source: entries are matched on `key` and only fill
/// currently empty `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedPatchSource {
    pub file: String,
    pub key: String,
    pub fields: Vec<String>,
}

/// Declarative description of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity: EntityType,
    pub label: String,
    pub primary_key: String,
    pub prefix: String,
    #[serde(default)]
    pub foreign_keys: Vec<String>,
    #[serde(default)]
    pub require_any_of: Vec<String>,
    pub validation_status_field: String,
    /// Input field name to output field name.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    #[serde(default)]
    pub address: Option<AddressMapping>,
    #[serde(default)]
    pub patches: Vec<JoinedPatchSource>,
    pub fields: Vec<FieldSpec>,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Resolves a record key to its declared field, following renames.
    pub fn field_for_key(&self, key: &str) -> Option<&FieldSpec> {
        self.field(key)
            .or_else(|| self.rename.get(key).and_then(|target| self.field(target)))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Keys a raw record may carry without being flagged as unknown.
    pub fn is_known_key(&self, key: &str) -> bool {
        self.field_for_key(key).is_some() || key == self.validation_status_field
    }

    /// Output field names in declaration order.
    pub fn output_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.unique)
    }

    pub fn array_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.field_type.is_array())
    }

    pub fn date_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|field| field.field_type == FieldType::Date)
    }

    pub fn identifier_fields(&self) -> impl Iterator<Item = (&FieldSpec, IdentifierKind)> {
        self.fields
            .iter()
            .filter_map(|field| field.identifier.map(|kind| (field, kind)))
    }

    /// First field validated as the given identifier.
    pub fn identifier_field(&self, kind: IdentifierKind) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|field| field.identifier == Some(kind))
    }

    pub fn length_caps(&self) -> impl Iterator<Item = (&str, usize)> {
        self.fields
            .iter()
            .filter_map(|field| field.max_length.map(|cap| (field.name.as_str(), cap)))
    }

    pub fn default_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|field| field.default.as_ref().map(|value| (field.name.as_str(), value)))
    }

    /// Primary key and reference slots: validated, never coerced.
    pub fn is_key_field(&self, name: &str) -> bool {
        name == self.primary_key || self.foreign_keys.iter().any(|fk| fk == name)
    }

    /// Field name without the entity prefix (`tra_denomination` -> `denomination`).
    pub fn unprefixed<'a>(&self, field: &'a str) -> &'a str {
        field
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(field)
    }

    /// Checks internal consistency and compiles declared patterns.
    pub fn validate(&self) -> Result<(), StandardsError> {
        let entity = self.entity;
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(StandardsError::invalid(
                    entity,
                    format!("duplicate field {}", field.name),
                ));
            }
            if field.set_valued && !field.field_type.is_array() {
                return Err(StandardsError::invalid(
                    entity,
                    format!("{} is set-valued but not an array", field.name),
                ));
            }
            if let Some(pattern) = &field.pattern {
                Regex::new(pattern).map_err(|source| StandardsError::InvalidPattern {
                    entity,
                    field: field.name.clone(),
                    source,
                })?;
            }
        }

        let require = |name: &str, role: &str| -> Result<(), StandardsError> {
            if seen.contains(name) {
                Ok(())
            } else {
                Err(StandardsError::invalid(
                    entity,
                    format!("{role} references undeclared field {name}"),
                ))
            }
        };

        require(&self.primary_key, "primary_key")?;
        for fk in &self.foreign_keys {
            require(fk, "foreign_keys")?;
        }
        for slot in &self.require_any_of {
            require(slot, "require_any_of")?;
        }
        for target in self.rename.values() {
            require(target, "rename")?;
        }
        if let Some(address) = &self.address {
            require(&address.source, "address.source")?;
            for component in address.components() {
                require(component, "address")?;
            }
        }
        for source in &self.patches {
            require(&source.key, "patches.key")?;
            for field in &source.fields {
                require(field, "patches.fields")?;
            }
        }
        Ok(())
    }
}

/// Compiled `pattern` rules of a schema.
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    patterns: Vec<(String, Regex)>,
}

impl FieldPatterns {
    pub fn compile(schema: &EntitySchema) -> Result<Self, StandardsError> {
        let mut patterns = Vec::new();
        for field in &schema.fields {
            if let Some(pattern) = &field.pattern {
                let regex = Regex::new(pattern).map_err(|source| StandardsError::InvalidPattern {
                    entity: schema.entity,
                    field: field.name.clone(),
                    source,
                })?;
                patterns.push((field.name.clone(), regex));
            }
        }
        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Regex)> {
        self.patterns
            .iter()
            .map(|(field, regex)| (field.as_str(), regex))
    }
}
