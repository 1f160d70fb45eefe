//! Pipeline driver behaviour: stage order, failure isolation, options.

use anyhow::{Result, bail};
use cleanse_core::{
    CleaningContext, CleaningOptions, CleaningStage, PipelineState, build_default_pipeline,
};
use cleanse_model::{Category, EntityType, Record};
use cleanse_standards::Standards;
use proptest::prelude::*;
use serde_json::{Value, json};

struct FailingStage;

impl CleaningStage for FailingStage {
    fn execute(
        &self,
        _records: &mut Vec<Record>,
        _ctx: &CleaningContext,
        _state: &mut PipelineState,
    ) -> Result<()> {
        bail!("lookup table unavailable")
    }

    fn stage_name(&self) -> &str {
        "failing"
    }
}

struct DroppingStage;

impl CleaningStage for DroppingStage {
    fn execute(
        &self,
        records: &mut Vec<Record>,
        _ctx: &CleaningContext,
        _state: &mut PipelineState,
    ) -> Result<()> {
        records.pop();
        Ok(())
    }

    fn stage_name(&self) -> &str {
        "dropping"
    }
}

fn values(input: Value) -> Vec<Value> {
    match input {
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[test]
fn default_stage_order() {
    let pipeline = build_default_pipeline();
    assert_eq!(
        pipeline.stage_names(),
        vec![
            "structure",
            "normalize",
            "coerce",
            "identifiers",
            "address",
            "dates",
            "cross_field",
            "patches",
            "final_model"
        ]
    );
}

#[test]
fn skipped_stages_are_not_recorded() {
    let standards = Standards::load_from(None).unwrap();
    let schema = standards.schema(EntityType::Transports).unwrap();
    let ctx = CleaningContext::new(schema, standards.departments());
    let outcome = build_default_pipeline().run(values(json!([{"tra_id": 1}])), &ctx);
    assert!(!outcome.executed_stages.iter().any(|s| s == "address"));
    assert!(!outcome.executed_stages.iter().any(|s| s == "patches"));
    assert_eq!(outcome.executed_stages.last().map(String::as_str), Some("final_model"));
}

#[test]
fn failing_stage_is_reported_and_pipeline_continues() {
    let standards = Standards::load_from(None).unwrap();
    let schema = standards.schema(EntityType::Transports).unwrap();
    let ctx = CleaningContext::new(schema, standards.departments());
    let pipeline = build_default_pipeline().insert_stage(1, Box::new(FailingStage));
    let input = values(json!([{"tra_id": 1, "tra_denomination": "geodis"}]));
    let outcome = pipeline.run(input, &ctx);

    let failures: Vec<_> = outcome.errors.of_kind("stage_failed").collect();
    assert_eq!(failures.len(), 1);
    insta::assert_snapshot!(
        failures[0].message.as_str(),
        @"stage failing failed: lookup table unavailable"
    );
    assert_eq!(outcome.records[0]["tra_denomination"], "GEODIS");
}

#[test]
fn dropped_records_are_reported() {
    let standards = Standards::load_from(None).unwrap();
    let schema = standards.schema(EntityType::Transports).unwrap();
    let ctx = CleaningContext::new(schema, standards.departments());
    let pipeline = build_default_pipeline()
        .remove_stage("final_model")
        .add_stage(Box::new(DroppingStage));
    let outcome = pipeline.run(values(json!([{"tra_id": 1}, {"tra_id": 2}])), &ctx);
    assert_eq!(outcome.errors.of_kind("record_count_mismatch").count(), 1);
}

#[test]
fn uppercase_can_be_disabled() {
    let standards = Standards::load_from(None).unwrap();
    let schema = standards.schema(EntityType::Transports).unwrap();
    let options = CleaningOptions {
        uppercase_text: false,
        ..CleaningOptions::default()
    };
    let ctx = CleaningContext::new(schema, standards.departments()).with_options(options);
    let input = values(json!([{"tra_id": 1, "tra_denomination": " Géodis "}]));
    let outcome = build_default_pipeline().run(input, &ctx);
    assert_eq!(outcome.records[0]["tra_denomination"], "Geodis");
}

#[test]
fn wrapped_input_is_flagged() {
    let standards = Standards::load_from(None).unwrap();
    let schema = standards.schema(EntityType::Transports).unwrap();
    let ctx =
        CleaningContext::new(schema, standards.departments()).with_input_wrapper("transports");
    let outcome = build_default_pipeline().run(values(json!([{"tra_id": 1}])), &ctx);
    assert_eq!(outcome.errors.of_kind("wrapped_input_array").count(), 1);
}

proptest! {
    #[test]
    fn cleaning_is_idempotent_for_transports(
        name in "[ a-zA-Zéèà'.,-]{1,40}",
        imports in proptest::collection::vec(0i64..50, 0..8),
        phone in "[0-9 ]{0,14}",
    ) {
        let standards = Standards::load_from(None).unwrap();
        let schema = standards.schema(EntityType::Transports).unwrap();
        let ctx = CleaningContext::new(schema, standards.departments());
        let pipeline = build_default_pipeline();

        let input = json!([{
            "tra_id": 1,
            "tra_denomination": name,
            "tra_phone": phone,
            "stock_import": imports,
        }]);
        let first = pipeline.run(values(input), &ctx);
        prop_assert_eq!(first.records.len(), 1);
        prop_assert!(first.records[0]["stock_import"].is_array());

        let again: Vec<Value> = first.records.iter().cloned().map(Value::Object).collect();
        let second = pipeline.run(again, &ctx);
        prop_assert_eq!(&second.records, &first.records);
        prop_assert!(second.errors.category(Category::Normalization).is_empty());
        prop_assert!(second.errors.iter().all(|obs| obs.kind != "array_deduplicated"));
    }
}
