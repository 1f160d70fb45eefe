//! Cleaned entity output.

use std::path::Path;

use cleanse_model::Record;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{ReportError, Result};

/// Writes the cleaned records as a pretty-printed UTF-8 JSON array.
pub fn write_cleaned_json(path: &Path, records: &[Record]) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(records).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)?;
    debug!(path = %path.display(), record_count = records.len(), "wrote cleaned output");
    Ok(())
}
