//! Patch file reading.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::input::records_from_document;

/// Patch entries of one file, in file order.
#[derive(Debug, Clone)]
pub struct PatchFile {
    pub path: PathBuf,
    pub entries: Vec<Value>,
}

/// Reads a patch file. A missing file is `Ok(None)`.
pub fn read_patch_file(path: &Path) -> Result<Option<PatchFile>> {
    if !path.is_file() {
        debug!(path = %path.display(), "patch file not present");
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&text).map_err(|source| IngestError::JsonParse {
        path: path.to_path_buf(),
        source,
    })?;
    let (entries, _) = records_from_document(path, document)?;
    debug!(path = %path.display(), entries = entries.len(), "read patch file");
    Ok(Some(PatchFile {
        path: path.to_path_buf(),
        entries,
    }))
}
