//! Raw record input.

use std::path::{Path, PathBuf};

use cleanse_standards::sha256_hex;
use serde_json::Value;
use tracing::debug;

use crate::error::{IngestError, Result, json_kind};

/// Parsed input file.
#[derive(Debug, Clone)]
pub struct RawInput {
    pub path: PathBuf,
    /// Raw elements in file order. Non-object elements are kept so that
    /// record positions match the file.
    pub records: Vec<Value>,
    /// SHA-256 of the file bytes.
    pub sha256: String,
    /// Key of the single-array wrapper object, when the array was nested.
    pub wrapped_in: Option<String>,
}

/// Extracts the record array from a document: either a top-level array or
/// an object whose only member is an array.
pub fn records_from_document(path: &Path, document: Value) -> Result<(Vec<Value>, Option<String>)> {
    match document {
        Value::Array(records) => Ok((records, None)),
        Value::Object(map) if map.len() == 1 => {
            let found = map.values().next().map_or("an object", json_kind);
            match map.into_iter().next() {
                Some((key, Value::Array(records))) => Ok((records, Some(key))),
                _ => Err(IngestError::NotAnArray {
                    path: path.to_path_buf(),
                    found,
                }),
            }
        }
        other => Err(IngestError::NotAnArray {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

/// Reads and parses a raw entity file.
pub fn read_input(path: &Path) -> Result<RawInput> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let sha256 = sha256_hex(&bytes);
    let document: Value =
        serde_json::from_slice(&bytes).map_err(|source| IngestError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    let (records, wrapped_in) = records_from_document(path, document)?;
    debug!(
        path = %path.display(),
        record_count = records.len(),
        bytes = bytes.len(),
        "read input"
    );
    Ok(RawInput {
        path: path.to_path_buf(),
        records,
        sha256,
        wrapped_in,
    })
}
