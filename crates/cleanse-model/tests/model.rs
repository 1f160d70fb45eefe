use serde_json::json;

use cleanse_model::{
    Category, EntityType, ErrorAccumulator, Observation, Record, RecordExt, Severity,
    ValidationStatus,
};

#[test]
fn accumulator_serializes_by_category() {
    let mut errors = ErrorAccumulator::new();
    errors.push(
        Observation::warning(
            Category::Identifier,
            "siren_missing_leading_zero",
            "SIREN had 8 digits; a leading zero was restored",
        )
        .at(0, Some(175))
        .with_field("co_siren")
        .with_change("51370338", "051370338"),
    );
    errors.push(Observation::info(Category::Patch, "patch_file_missing", "no patch file"));

    let json = serde_json::to_value(&errors).expect("serialize accumulator");
    let identifier = &json["categories"]["identifier"][0];
    assert_eq!(identifier["type"], "siren_missing_leading_zero");
    assert_eq!(identifier["severity"], "warning");
    assert_eq!(identifier["entity_id"], 175);
    assert_eq!(identifier["new"], "051370338");
    assert_eq!(json["categories"]["patch"][0]["row"], serde_json::Value::Null);

    let round: ErrorAccumulator = serde_json::from_value(json).expect("deserialize accumulator");
    assert_eq!(round.len(), 2);
    assert_eq!(round.counts().get(Severity::Warning), 1);
}

#[test]
fn validation_status_serializes_for_reporting() {
    let mut status = ValidationStatus::new();
    status.pass("tra_id");
    status.fail("tra_denomination", "missing_required_field");
    let value = serde_json::to_value(&status).expect("serialize status");
    assert_eq!(value["is_valid"], false);
    assert_eq!(value["field_status"]["tra_id"], true);
    assert_eq!(value["error_details"][0]["field"], "tra_denomination");
}

#[test]
fn records_keep_field_order() {
    let raw = json!({"tra_id": 2, "tra_denomination": "Geodis", "stock_import": [190]});
    let record: Record = serde_json::from_value(raw).expect("object record");
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["tra_id", "tra_denomination", "stock_import"]);
    assert_eq!(record.text("tra_denomination"), Some("Geodis"));
}

#[test]
fn every_entity_has_distinct_files() {
    let mut inputs: Vec<String> = EntityType::all()
        .iter()
        .map(EntityType::default_input_file)
        .collect();
    inputs.sort();
    inputs.dedup();
    assert_eq!(inputs.len(), EntityType::all().len());
}
