//! Output generation for cleaned entities.
//!
//! - **Cleaned JSON**: the pipeline output, written atomically
//! - **Error workbook**: multi-sheet XLSX report of every observation
//! - **JSON / CSV reports**: machine-readable copies of the accumulator
//! - **Run manifest**: provenance of one run (input digest, counts, paths)

mod atomic;
mod cleaned;
mod csv_report;
mod error;
mod format;
mod json_report;
mod manifest;
mod reports;
mod workbook;

pub use atomic::write_atomic;
pub use cleaned::write_cleaned_json;
pub use csv_report::render_csv_report;
pub use error::{ReportError, Result};
pub use format::ReportFormat;
pub use json_report::render_json_report;
pub use manifest::{RunManifest, manifest_path, write_run_manifest};
pub use reports::{ReportInput, report_path, write_error_reports};
pub use workbook::{render_workbook, sheet_name};
