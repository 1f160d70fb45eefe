//! Staged cleansing pipeline for business-entity records.
//!
//! The pipeline is parametric over [`cleanse_standards::EntitySchema`]: every
//! entity type runs the same stages, and entity-specific behaviour comes from
//! the schema's field declarations, address layout and patch sources.

pub mod address;
pub mod context;
pub mod pipeline;
pub mod stages;

pub use address::{AddressParser, AddressShape, ParsedAddress, prune_house_number};
pub use context::{CleaningContext, CleaningOptions};
pub use pipeline::{
    CleaningOutcome, CleaningStage, EntityPipeline, PipelineState, build_default_pipeline,
    clean_records,
};
