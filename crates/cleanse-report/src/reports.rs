//! Error report emission.

use std::path::{Path, PathBuf};

use cleanse_model::{EntityType, ErrorAccumulator};
use serde_json::Value;
use tracing::info;

use crate::atomic::write_atomic;
use crate::csv_report::render_csv_report;
use crate::error::{ReportError, Result};
use crate::format::ReportFormat;
use crate::json_report::render_json_report;
use crate::workbook::render_workbook;

/// Everything an error report is built from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub entity: EntityType,
    pub errors: &'a ErrorAccumulator,
    /// Input elements exactly as read.
    pub original: &'a [Value],
}

/// `<dir>/<entity>_error_report.<ext>`
pub fn report_path(dir: &Path, entity: EntityType, format: ReportFormat) -> PathBuf {
    dir.join(format!("{}_error_report.{}", entity.as_str(), format.extension()))
}

/// Writes one report per requested format.
///
/// Nothing is written when the accumulator is empty. Returned paths follow
/// the order of `formats`, with repeated formats written once.
pub fn write_error_reports(
    dir: &Path,
    input: &ReportInput<'_>,
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>> {
    if input.errors.is_empty() {
        return Ok(Vec::new());
    }
    let mut written: Vec<PathBuf> = Vec::new();
    let mut seen: Vec<ReportFormat> = Vec::new();
    for format in formats {
        if seen.contains(format) {
            continue;
        }
        seen.push(*format);
        let path = report_path(dir, input.entity, *format);
        let bytes = render(&path, input, *format)?;
        write_atomic(&path, &bytes)?;
        info!(
            entity = %input.entity,
            format = %format,
            path = %path.display(),
            observations = input.errors.len(),
            "wrote error report"
        );
        written.push(path);
    }
    Ok(written)
}

fn render(path: &Path, input: &ReportInput<'_>, format: ReportFormat) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Xlsx => render_workbook(input).map_err(|source| ReportError::Xlsx {
            path: path.to_path_buf(),
            source,
        }),
        ReportFormat::Json => render_json_report(input.entity, input.original.len(), input.errors)
            .map_err(|source| ReportError::Json {
                path: path.to_path_buf(),
                source,
            }),
        ReportFormat::Csv => render_csv_report(input.errors).map_err(|source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        }),
    }
}
