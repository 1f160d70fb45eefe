use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{info, info_span};

use cleanse_cli::{CleanOptions, CleanRequest, CleanResult, clean_with_standards};
use cleanse_ingest::discover_entity_inputs;
use cleanse_model::EntityType;
use cleanse_report::ReportFormat;
use cleanse_standards::Standards;

use crate::cli::{BatchArgs, CleanArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_entities() -> Result<()> {
    let standards = Standards::load().context("load entity schemas")?;
    let mut table = Table::new();
    table.set_header(vec![
        "Entity", "Label", "Fields", "Required", "Unique", "Digest", "Source",
    ]);
    apply_table_style(&mut table);
    for loaded in standards.schemas() {
        let schema = &loaded.schema;
        let required: Vec<&str> = schema
            .required_fields()
            .map(|field| field.name.as_str())
            .collect();
        let unique: Vec<&str> = schema
            .unique_fields()
            .map(|field| field.name.as_str())
            .collect();
        table.add_row(vec![
            schema.entity.as_str().to_string(),
            schema.label.clone(),
            schema.fields.len().to_string(),
            required.join(", "),
            unique.join(", "),
            loaded.digest.chars().take(12).collect(),
            loaded.origin.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_clean(args: &CleanArgs, log_data: bool) -> Result<CleanResult> {
    let standards = Standards::load().context("load entity schemas")?;
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(args.entity.default_input_file()));
    let output = args.output.clone().unwrap_or_else(|| {
        input_dir(&input)
            .join("cleaned")
            .join(args.entity.default_output_file())
    });
    let request = build_request(args.entity, &input, &output, &args.run, log_data)?;
    clean_with_standards(&request, &standards)
}

pub fn run_batch(args: &BatchArgs, log_data: bool) -> Result<Vec<CleanResult>> {
    let batch_span = info_span!("batch", input_dir = %args.input_dir.display());
    let _batch_guard = batch_span.enter();
    let started = Instant::now();
    let standards = Standards::load().context("load entity schemas")?;
    let inputs = discover_entity_inputs(&args.input_dir).context("discover input files")?;
    if inputs.is_empty() {
        bail!(
            "no entity input files found in {}",
            args.input_dir.display()
        );
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.input_dir.join("cleaned"));

    let mut results = Vec::with_capacity(inputs.len());
    for (entity, input) in inputs {
        let output = output_dir.join(entity.default_output_file());
        let request = build_request(entity, &input, &output, &args.run, log_data)?;
        results.push(clean_with_standards(&request, &standards)?);
    }
    info!(
        entity_count = results.len(),
        duration_ms = started.elapsed().as_millis(),
        "batch complete"
    );
    Ok(results)
}

fn input_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Resolves default directories and creates the ones outputs go to.
fn build_request(
    entity: EntityType,
    input: &Path,
    output: &Path,
    run: &RunArgs,
    log_data: bool,
) -> Result<CleanRequest> {
    let output_dir = input_dir(output);
    let report_dir = run.report_dir.clone().unwrap_or_else(|| output_dir.clone());
    let log_dir = run.log_dir.clone().unwrap_or_else(|| output_dir.join("logs"));
    let patches_dir = run.patches_dir.clone().or_else(|| {
        let candidate = input_dir(input).join("patches");
        candidate.is_dir().then_some(candidate)
    });
    for dir in [&output_dir, &report_dir, &log_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create directory {}", dir.display()))?;
    }

    let formats: Vec<ReportFormat> = run
        .report_formats
        .iter()
        .copied()
        .map(ReportFormat::from)
        .collect();
    let options = CleanOptions::default()
        .with_uppercase_text(!run.no_uppercase)
        .with_apply_patches(!run.no_patches)
        .with_write_error_report(!run.no_error_report)
        .with_report_formats(formats)
        .with_fail_on_errors(run.fail_on_errors)
        .with_log_data(log_data);

    Ok(CleanRequest::new(entity, input, output)
        .with_patches_dir(patches_dir)
        .with_error_report_dir(report_dir)
        .with_log_dir(Some(log_dir))
        .with_options(options))
}
