//! The `clean` invocation contract.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use cleanse_core::{CleaningContext, clean_records};
use cleanse_ingest::read_input;
use cleanse_model::{
    Category, EntityType, ErrorAccumulator, Observation, SeverityCounts, display_value,
};
use cleanse_report::{
    ReportFormat, ReportInput, RunManifest, write_cleaned_json, write_error_reports,
    write_run_manifest,
};
use cleanse_standards::Standards;
use serde_json::Value;
use tracing::{error, info, info_span, trace, warn};

use crate::logging::redact_value;
use crate::options::CleanRequest;

/// Outcome of one entity run.
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub entity: EntityType,
    /// False when the input could not be read or an output could not be
    /// written.
    pub success: bool,
    pub output_path: PathBuf,
    /// The workbook when one was written, otherwise the first report.
    pub error_report_path: Option<PathBuf>,
    pub report_paths: Vec<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub record_count: usize,
    pub valid_count: usize,
    pub counts: SeverityCounts,
    pub counts_by_category: BTreeMap<Category, SeverityCounts>,
    pub duration_ms: u64,
}

impl CleanResult {
    pub fn has_errors(&self) -> bool {
        self.counts.error > 0
    }

    /// Exit policy: unsuccessful runs always fail; error observations fail
    /// the run only when `fail_on_errors` is set.
    pub fn is_failure(&self, fail_on_errors: bool) -> bool {
        !self.success || (fail_on_errors && self.has_errors())
    }
}

/// Cleans one entity file with the standards from the environment.
pub fn clean(request: &CleanRequest) -> Result<CleanResult> {
    let standards = Standards::load().context("load entity schemas")?;
    clean_with_standards(request, &standards)
}

/// Cleans one entity file.
///
/// Only a missing schema is returned as `Err`. Input and output failures
/// are recorded as `general` observations and reported through
/// [`CleanResult::success`].
pub fn clean_with_standards(request: &CleanRequest, standards: &Standards) -> Result<CleanResult> {
    let entity = request.entity;
    let span = info_span!("entity", entity = %entity);
    let _guard = span.enter();
    let started = Instant::now();
    let schema = standards
        .schema(entity)
        .with_context(|| format!("no schema loaded for {entity}"))?;
    let mut manifest = RunManifest::new(entity, &request.input_path, &request.output_path);

    let mut errors = ErrorAccumulator::new();
    let mut original: Vec<Value> = Vec::new();
    let mut record_count = 0;
    let mut valid_count = 0;
    let mut success = true;

    match read_input(&request.input_path) {
        Ok(input) => {
            manifest.input_sha256 = Some(input.sha256.clone());
            let mut ctx = CleaningContext::new(schema, standards.departments())
                .with_options(request.options.cleaning_options());
            if let Some(dir) = request.patches_dir.as_deref() {
                ctx = ctx.with_patches_dir(dir);
            }
            if let Some(key) = input.wrapped_in.as_deref() {
                ctx = ctx.with_input_wrapper(key);
            }

            let outcome = clean_records(input.records.clone(), &ctx);
            record_count = outcome.records.len();
            valid_count = outcome.valid_count();
            let written = write_cleaned_json(&request.output_path, &outcome.records);
            errors = outcome.errors;
            if let Err(err) = written {
                error!(path = %request.output_path.display(), error = %err, "cannot write cleaned output");
                errors.push(Observation::error(
                    Category::General,
                    "output_write_failed",
                    err.to_string(),
                ));
                success = false;
            }
            original = input.records;
        }
        Err(err) => {
            error!(path = %request.input_path.display(), error = %err, "cannot read input");
            errors.push(Observation::error(
                Category::General,
                "input_read_failed",
                err.to_string(),
            ));
            success = false;
        }
    }

    if request.options.log_data {
        trace_error_values(&errors);
    }

    let mut report_paths = Vec::new();
    if request.options.write_error_report {
        let input = ReportInput {
            entity,
            errors: &errors,
            original: &original,
        };
        match write_error_reports(
            &request.error_report_dir,
            &input,
            &request.options.report_formats,
        ) {
            Ok(paths) => report_paths = paths,
            Err(err) => {
                warn!(error = %err, "error report not written");
                success = false;
            }
        }
    }
    let error_report_path = report_paths
        .iter()
        .find(|path| {
            path.extension()
                .is_some_and(|ext| ext == ReportFormat::Xlsx.extension())
        })
        .or_else(|| report_paths.first())
        .cloned();

    let counts = errors.counts();
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    manifest.record_count = record_count;
    manifest.counts = counts;
    manifest.report_paths.clone_from(&report_paths);
    manifest.duration_ms = duration_ms;
    manifest.success = success;
    let manifest_path = request.log_dir.as_deref().and_then(|dir| {
        write_run_manifest(dir, &manifest)
            .inspect_err(|err| warn!(error = %err, "run manifest not written"))
            .ok()
    });

    info!(
        record_count,
        valid_count,
        errors = counts.error,
        warnings = counts.warning,
        infos = counts.info,
        duration_ms,
        success,
        "entity cleaned"
    );

    Ok(CleanResult {
        entity,
        success,
        output_path: request.output_path.clone(),
        error_report_path,
        report_paths,
        manifest_path,
        record_count,
        valid_count,
        counts,
        counts_by_category: errors.counts_by_category(),
        duration_ms,
    })
}

/// Emits error observations with their values at trace level, redacted
/// unless data logging was enabled for the subscriber.
fn trace_error_values(errors: &ErrorAccumulator) {
    for obs in errors.iter().filter(|obs| obs.is_error()) {
        let value = obs.original.as_ref().map(display_value).unwrap_or_default();
        trace!(
            kind = %obs.kind,
            field = obs.field.as_deref().unwrap_or("-"),
            entity_id = ?obs.entity_id,
            value = %redact_value(&value),
            "error observation"
        );
    }
}
