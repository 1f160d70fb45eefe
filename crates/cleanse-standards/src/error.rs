#![deny(unsafe_code)]

use std::path::PathBuf;

use cleanse_model::EntityType;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse table {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("schema {origin} declares entity {found}, expected {expected}")]
    EntityMismatch {
        origin: String,
        expected: EntityType,
        found: EntityType,
    },

    #[error("invalid schema for {entity}: {message}")]
    InvalidSchema { entity: EntityType, message: String },

    #[error("invalid pattern for {entity}.{field}: {source}")]
    InvalidPattern {
        entity: EntityType,
        field: String,
        #[source]
        source: regex::Error,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(entity: EntityType, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            entity,
            message: message.into(),
        }
    }
}
