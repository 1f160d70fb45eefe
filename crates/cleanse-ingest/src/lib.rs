//! Reading raw entity files and patch files.

pub mod discovery;
pub mod error;
pub mod input;
pub mod patches;

pub use discovery::discover_entity_inputs;
pub use error::{IngestError, Result};
pub use input::{RawInput, read_input, records_from_document};
pub use patches::{PatchFile, read_patch_file};
