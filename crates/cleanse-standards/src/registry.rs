//! Schema registry.
//!
//! Schemas ship embedded in the crate. Setting `CLEANSE_SCHEMA_DIR` points
//! the registry at a directory of `<entity>.toml` overrides; entities
//! without an override file keep their embedded schema.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cleanse_model::EntityType;

use crate::departments::DepartmentTable;
use crate::error::StandardsError;
use crate::hash::sha256_hex;
use crate::schema::EntitySchema;

/// Environment variable for overriding the schema directory.
pub const SCHEMA_DIR_ENV_VAR: &str = "CLEANSE_SCHEMA_DIR";

fn embedded_source(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Companies => include_str!("../data/entities/companies.toml"),
        EntityType::Organizations => include_str!("../data/entities/organizations.toml"),
        EntityType::LogisticAddresses => {
            include_str!("../data/entities/logistic_addresses.toml")
        }
        EntityType::StockImports => include_str!("../data/entities/stock_imports.toml"),
        EntityType::Stocks => include_str!("../data/entities/stocks.toml"),
        EntityType::Transports => include_str!("../data/entities/transports.toml"),
    }
}

/// Override directory from the environment, if set.
pub fn schema_override_dir() -> Option<PathBuf> {
    std::env::var_os(SCHEMA_DIR_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// A parsed schema together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub schema: EntitySchema,
    /// `embedded:<entity>.toml` or the override file path.
    pub origin: String,
    /// SHA-256 of the schema document.
    pub digest: String,
}

/// Parses and validates one schema document.
pub fn parse_schema(
    entity: EntityType,
    source: &str,
    origin: &str,
) -> Result<EntitySchema, StandardsError> {
    let schema: EntitySchema = toml::from_str(source).map_err(|source| StandardsError::Toml {
        origin: origin.to_string(),
        source,
    })?;
    if schema.entity != entity {
        return Err(StandardsError::EntityMismatch {
            origin: origin.to_string(),
            expected: entity,
            found: schema.entity,
        });
    }
    schema.validate()?;
    Ok(schema)
}

/// Loads one schema, preferring an override file in `override_dir`.
pub fn load_schema(
    entity: EntityType,
    override_dir: Option<&Path>,
) -> Result<LoadedSchema, StandardsError> {
    let file_name = format!("{}.toml", entity.as_str());
    if let Some(dir) = override_dir {
        let path = dir.join(&file_name);
        if path.is_file() {
            let source =
                std::fs::read_to_string(&path).map_err(|err| StandardsError::io(&path, err))?;
            let origin = path.display().to_string();
            let schema = parse_schema(entity, &source, &origin)?;
            return Ok(LoadedSchema {
                schema,
                origin,
                digest: sha256_hex(source.as_bytes()),
            });
        }
    }
    let source = embedded_source(entity);
    let origin = format!("embedded:{file_name}");
    let schema = parse_schema(entity, source, &origin)?;
    Ok(LoadedSchema {
        schema,
        origin,
        digest: sha256_hex(source.as_bytes()),
    })
}

/// Every schema plus the department table.
#[derive(Debug, Clone)]
pub struct Standards {
    schemas: BTreeMap<EntityType, LoadedSchema>,
    departments: DepartmentTable,
}

impl Standards {
    /// Loads embedded standards, honouring `CLEANSE_SCHEMA_DIR`.
    pub fn load() -> Result<Self, StandardsError> {
        Self::load_from(schema_override_dir().as_deref())
    }

    /// Loads embedded standards with an explicit override directory.
    pub fn load_from(override_dir: Option<&Path>) -> Result<Self, StandardsError> {
        let mut schemas = BTreeMap::new();
        for entity in EntityType::all() {
            schemas.insert(*entity, load_schema(*entity, override_dir)?);
        }
        Ok(Self {
            schemas,
            departments: DepartmentTable::embedded()?,
        })
    }

    pub fn schema(&self, entity: EntityType) -> Option<&EntitySchema> {
        self.schemas.get(&entity).map(|loaded| &loaded.schema)
    }

    pub fn loaded(&self, entity: EntityType) -> Option<&LoadedSchema> {
        self.schemas.get(&entity)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &LoadedSchema> {
        self.schemas.values()
    }

    pub fn departments(&self) -> &DepartmentTable {
        &self.departments
    }
}
