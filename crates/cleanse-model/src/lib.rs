//! Core data model for the business-entity cleansing pipeline.

pub mod accumulator;
pub mod entity;
pub mod error;
pub mod observation;
pub mod record;
pub mod validation_status;

pub use accumulator::{ErrorAccumulator, SeverityCounts};
pub use entity::EntityType;
pub use error::{ModelError, Result};
pub use observation::{Category, Observation, Severity};
pub use record::{Record, RecordExt, display_value, is_blank};
pub use validation_status::{FieldError, ValidationStatus};
