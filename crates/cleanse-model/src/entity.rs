//! Entity types handled by the cleansing pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Business entity families extracted from the operational database.
///
/// Each entity type has its own schema (field list, caps, unique fields)
/// and its own cleaned output file, but all of them run through the same
/// staged pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Companies,
    Organizations,
    LogisticAddresses,
    StockImports,
    Stocks,
    Transports,
}

impl EntityType {
    /// All entity types in processing order.
    pub const fn all() -> &'static [Self] {
        &[
            Self::Companies,
            Self::Organizations,
            Self::LogisticAddresses,
            Self::StockImports,
            Self::Stocks,
            Self::Transports,
        ]
    }

    /// Machine token used on the command line and in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Organizations => "organizations",
            Self::LogisticAddresses => "logistic_addresses",
            Self::StockImports => "stock_imports",
            Self::Stocks => "stocks",
            Self::Transports => "transports",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Companies => "Companies",
            Self::Organizations => "Organizations",
            Self::LogisticAddresses => "Logistic addresses",
            Self::StockImports => "Stock imports",
            Self::Stocks => "Stocks",
            Self::Transports => "Transports",
        }
    }

    /// Conventional raw input file name (`<token>.json`).
    pub fn default_input_file(&self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Conventional cleaned output file name.
    pub fn default_output_file(&self) -> String {
        format!("{}_cleaned.json", self.as_str())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ModelError;

    /// Accepts the plural token, the singular form, and hyphenated spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "companies" | "company" => Ok(Self::Companies),
            "organizations" | "organization" | "organisations" | "organisation" => {
                Ok(Self::Organizations)
            }
            "logistic_addresses" | "logistic_address" => Ok(Self::LogisticAddresses),
            "stock_imports" | "stock_import" => Ok(Self::StockImports),
            "stocks" | "stock" => Ok(Self::Stocks),
            "transports" | "transport" => Ok(Self::Transports),
            _ => Err(ModelError::UnknownEntity(s.to_string())),
        }
    }
}
