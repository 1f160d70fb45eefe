//! Run manifest: provenance of one cleaning run.

use std::path::{Path, PathBuf};

use cleanse_model::{EntityType, SeverityCounts};
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::error::{ReportError, Result};

/// Summary of one entity run, written next to the logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub entity: EntityType,
    pub input_path: PathBuf,
    /// SHA-256 of the input file, absent when it could not be read.
    pub input_sha256: Option<String>,
    pub record_count: usize,
    pub counts: SeverityCounts,
    pub output_path: PathBuf,
    pub report_paths: Vec<PathBuf>,
    /// RFC 3339 start time (UTC).
    pub started_at: String,
    pub duration_ms: u64,
    pub success: bool,
    pub tool_version: String,
}

impl RunManifest {
    pub fn new(entity: EntityType, input_path: &Path, output_path: &Path) -> Self {
        Self {
            entity,
            input_path: input_path.to_path_buf(),
            input_sha256: None,
            record_count: 0,
            counts: SeverityCounts::default(),
            output_path: output_path.to_path_buf(),
            report_paths: Vec::new(),
            started_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            duration_ms: 0,
            success: false,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `<log_dir>/<entity>_run.json`
pub fn manifest_path(log_dir: &Path, entity: EntityType) -> PathBuf {
    log_dir.join(format!("{}_run.json", entity.as_str()))
}

pub fn write_run_manifest(log_dir: &Path, manifest: &RunManifest) -> Result<PathBuf> {
    let path = manifest_path(log_dir, manifest.entity);
    let mut bytes = serde_json::to_vec_pretty(manifest).map_err(|source| ReportError::Json {
        path: path.clone(),
        source,
    })?;
    bytes.push(b'\n');
    write_atomic(&path, &bytes)?;
    Ok(path)
}
