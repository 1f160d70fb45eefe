//! Entity schemas and French reference tables for the cleansing pipeline.

pub mod departments;
pub mod error;
pub mod hash;
pub mod keywords;
pub mod registry;
pub mod schema;

pub use departments::{Department, DepartmentTable};
pub use error::StandardsError;
pub use hash::sha256_hex;
pub use registry::{
    LoadedSchema, SCHEMA_DIR_ENV_VAR, Standards, load_schema, parse_schema, schema_override_dir,
};
pub use schema::{
    AddressMapping, EntitySchema, FieldPatterns, FieldSpec, FieldType, IdentifierKind,
    JoinedPatchSource, PunctuationRule, TextCase,
};
