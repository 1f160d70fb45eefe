//! Input discovery for batch runs.

use std::path::{Path, PathBuf};

use cleanse_model::EntityType;

use crate::error::{IngestError, Result};

/// Entities whose conventional input file exists in `dir`, in processing order.
pub fn discover_entity_inputs(dir: &Path) -> Result<Vec<(EntityType, PathBuf)>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    Ok(EntityType::all()
        .iter()
        .map(|entity| (*entity, dir.join(entity.default_input_file())))
        .filter(|(_, path)| path.is_file())
        .collect())
}
