//! Entity cleaning pipeline with ordered stage execution.
//!
//! Each stage implements [`CleaningStage`] and runs over the whole record
//! set before the next one starts. Stages report through the shared
//! [`ErrorAccumulator`]; a stage that returns an error is recorded as a
//! `stage_failed` observation and the pipeline carries on.
//!
//! # Standard Stage Order
//!
//! 1. **structure** - JSON shape, primary keys, unknown fields
//! 2. **normalize** - whitespace, special characters, punctuation
//! 3. **coerce** - booleans, integers, floats, arrays, key types
//! 4. **identifiers** - SIREN, SIRET, VAT, RNA, postal codes, contacts
//! 5. **address** - free-form address decomposition
//! 6. **dates** - ISO date normalization
//! 7. **cross_field** - identifier consistency, uniqueness, set-valued arrays
//! 8. **patches** - targeted and key-joined patch overlays
//! 9. **final_model** - renames, defaults, length caps, validation status

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::Result;
use cleanse_model::{Category, ErrorAccumulator, Observation, Record, ValidationStatus};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::context::CleaningContext;
use crate::stages;

/// A single stage of the cleaning pipeline.
pub trait CleaningStage: Send + Sync {
    /// Run this stage over every record.
    ///
    /// # Arguments
    /// * `records` - Record set, modified in place; its length must not change
    /// * `ctx` - Schema, reference tables and run options
    /// * `state` - Accumulator and data shared between stages
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()>;

    /// Stable stage name used in logs and `stage_failed` observations.
    fn stage_name(&self) -> &str;

    /// Whether this stage should be skipped for the given context.
    fn should_skip(&self, _ctx: &CleaningContext) -> bool {
        false
    }
}

/// Mutable state shared across pipeline stages.
#[derive(Debug, Default)]
pub struct PipelineState {
    pub errors: ErrorAccumulator,
    /// Input positions that held something other than a JSON object.
    pub non_object_rows: BTreeSet<usize>,
    /// Validation status per record, filled by the final-model stage.
    pub statuses: Vec<ValidationStatus>,
    pub executed_stages: Vec<String>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct CleaningOutcome {
    /// Cleaned records, in input order, holding exactly the declared fields.
    pub records: Vec<Record>,
    pub statuses: Vec<ValidationStatus>,
    pub errors: ErrorAccumulator,
    pub executed_stages: Vec<String>,
}

impl CleaningOutcome {
    pub fn valid_count(&self) -> usize {
        self.statuses.iter().filter(|status| status.is_valid).count()
    }
}

/// An ordered pipeline of cleaning stages.
pub struct EntityPipeline {
    stages: Vec<Box<dyn CleaningStage>>,
}

impl Default for EntityPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage(mut self, stage: Box<dyn CleaningStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Insert a stage at a specific position.
    pub fn insert_stage(mut self, index: usize, stage: Box<dyn CleaningStage>) -> Self {
        self.stages.insert(index, stage);
        self
    }

    /// Remove a stage by name.
    pub fn remove_stage(mut self, stage_name: &str) -> Self {
        self.stages.retain(|s| s.stage_name() != stage_name);
        self
    }

    /// List stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.stage_name()).collect()
    }

    /// Clean raw input values.
    ///
    /// Non-object values are kept as empty records so that the output has
    /// the input's cardinality.
    pub fn run(&self, values: Vec<Value>, ctx: &CleaningContext) -> CleaningOutcome {
        let span = info_span!("clean", entity = %ctx.schema.entity);
        let _guard = span.enter();
        let started = Instant::now();

        let mut state = PipelineState::new();
        let input_count = values.len();
        let mut records: Vec<Record> = values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Value::Object(record) => record,
                _ => {
                    state.non_object_rows.insert(row);
                    Record::new()
                }
            })
            .collect();
        info!(record_count = input_count, "cleaning started");

        self.execute_with_state(&mut records, ctx, &mut state, input_count);

        let status_field = ctx.schema.validation_status_field.as_str();
        for record in &mut records {
            record.remove(status_field);
        }
        let counts = state.errors.counts();
        info!(
            record_count = records.len(),
            errors = counts.error,
            warnings = counts.warning,
            infos = counts.info,
            duration_ms = started.elapsed().as_millis() as u64,
            "cleaning finished"
        );

        CleaningOutcome {
            records,
            statuses: state.statuses,
            errors: state.errors,
            executed_stages: state.executed_stages,
        }
    }

    /// Execute all stages with provided state.
    pub fn execute_with_state(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
        expected_count: usize,
    ) {
        for stage in &self.stages {
            let name = stage.stage_name();
            if stage.should_skip(ctx) {
                debug!(stage = name, "stage skipped");
                continue;
            }
            let stage_span = info_span!("stage", stage = name);
            let _stage_guard = stage_span.enter();
            let before = state.errors.len();
            let stage_started = Instant::now();

            if let Err(error) = stage.execute(records, ctx, state) {
                warn!(error = %error, "stage failed");
                state.errors.push(Observation::error(
                    Category::General,
                    "stage_failed",
                    format!("stage {name} failed: {error:#}"),
                ));
            }
            if records.len() != expected_count {
                state.errors.push(Observation::error(
                    Category::General,
                    "record_count_mismatch",
                    format!(
                        "stage {name} left {} records, expected {expected_count}",
                        records.len()
                    ),
                ));
            }
            state.executed_stages.push(name.to_string());
            debug!(
                observations = state.errors.len() - before,
                duration_ms = stage_started.elapsed().as_millis() as u64,
                "stage finished"
            );
        }
    }
}

// ============================================================================
// Standard Cleaning Stages
// ============================================================================

/// Stage 1: JSON shape and primary keys.
pub struct StructureStage;

impl CleaningStage for StructureStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::structure::validate_structure(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "structure"
    }
}

/// Stage 2: whitespace, special characters and punctuation.
pub struct NormalizeStage;

impl CleaningStage for NormalizeStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::normalize::normalize_text_fields(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "normalize"
    }
}

/// Stage 3: type coercion.
pub struct CoerceStage;

impl CleaningStage for CoerceStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::coerce::coerce_types(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "coerce"
    }
}

/// Stage 4: identifier validation and repair.
pub struct IdentifierStage;

impl CleaningStage for IdentifierStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::identifiers::validate_identifiers(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "identifiers"
    }
}

/// Stage 5: address decomposition.
pub struct AddressStage;

impl CleaningStage for AddressStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::address::parse_addresses(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "address"
    }

    fn should_skip(&self, ctx: &CleaningContext) -> bool {
        ctx.schema.address.is_none()
    }
}

/// Stage 6: date normalization.
pub struct DateStage;

impl CleaningStage for DateStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::dates::normalize_dates(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "dates"
    }
}

/// Stage 7: consistency, uniqueness and set-valued arrays.
pub struct CrossFieldStage;

impl CleaningStage for CrossFieldStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::cross_field::validate_cross_field(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "cross_field"
    }
}

/// Stage 8: patch overlays.
pub struct PatchStage;

impl CleaningStage for PatchStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::patches::apply_patches(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "patches"
    }

    fn should_skip(&self, ctx: &CleaningContext) -> bool {
        !ctx.options.apply_patches || ctx.patches_dir.is_none()
    }
}

/// Stage 9: output shape and validation status.
pub struct FinalModelStage;

impl CleaningStage for FinalModelStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        ctx: &CleaningContext,
        state: &mut PipelineState,
    ) -> Result<()> {
        stages::final_model::shape_final_model(records, ctx, state)
    }

    fn stage_name(&self) -> &str {
        "final_model"
    }
}

/// Build the standard cleaning pipeline shared by every entity type.
pub fn build_default_pipeline() -> EntityPipeline {
    EntityPipeline::new()
        .add_stage(Box::new(StructureStage))
        .add_stage(Box::new(NormalizeStage))
        .add_stage(Box::new(CoerceStage))
        .add_stage(Box::new(IdentifierStage))
        .add_stage(Box::new(AddressStage))
        .add_stage(Box::new(DateStage))
        .add_stage(Box::new(CrossFieldStage))
        .add_stage(Box::new(PatchStage))
        .add_stage(Box::new(FinalModelStage))
}

/// Runs the standard pipeline.
pub fn clean_records(values: Vec<Value>, ctx: &CleaningContext) -> CleaningOutcome {
    build_default_pipeline().run(values, ctx)
}
