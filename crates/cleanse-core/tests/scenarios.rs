//! End-to-end cleaning scenarios over the embedded schemas.

use cleanse_core::{CleaningContext, CleaningOutcome, clean_records};
use cleanse_model::{EntityType, Record, Severity};
use cleanse_standards::Standards;
use serde_json::{Value, json};

fn standards() -> Standards {
    Standards::load_from(None).expect("embedded schemas load")
}

fn run(standards: &Standards, entity: EntityType, input: Value) -> CleaningOutcome {
    let schema = standards.schema(entity).expect("schema");
    let ctx = CleaningContext::new(schema, standards.departments());
    let Value::Array(values) = input else {
        panic!("scenario input must be an array");
    };
    clean_records(values, &ctx)
}

fn run_with_patches(
    standards: &Standards,
    entity: EntityType,
    input: Value,
    patches: &std::path::Path,
) -> CleaningOutcome {
    let schema = standards.schema(entity).expect("schema");
    let ctx = CleaningContext::new(schema, standards.departments()).with_patches_dir(patches);
    let Value::Array(values) = input else {
        panic!("scenario input must be an array");
    };
    clean_records(values, &ctx)
}

fn as_values(records: &[Record]) -> Value {
    Value::Array(records.iter().cloned().map(Value::Object).collect())
}

fn kinds(outcome: &CleaningOutcome, severity: Severity) -> Vec<&str> {
    outcome
        .errors
        .iter()
        .filter(|obs| obs.severity == severity)
        .map(|obs| obs.kind.as_str())
        .collect()
}

#[test]
fn company_with_zone_address_is_clean() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::Companies,
        json!([{
            "co_id": 175,
            "co_business_name": " lucas france ",
            "co_siren": "513703389",
            "co_siret": "51370338900017",
            "co_vat": "FR78513703389",
            "co_head_office_address": "ZONE ARTISANALE 2 GUILLEME",
            "co_head_office_postal_code": "33430",
            "co_head_office_city": "BAZAS",
            "co_legal_form": "SAS, société par actions simplifiée",
            "fk_us": 0
        }]),
    );

    let rec = &outcome.records[0];
    assert_eq!(rec["co_business_name"], "LUCAS FRANCE");
    assert_eq!(rec["co_siren"], "513703389");
    assert_eq!(rec["co_siret"], "51370338900017");
    assert_eq!(rec["co_vat"], "FR78513703389");
    assert_eq!(rec["co_head_office_number"], "");
    assert_eq!(rec["co_head_office_street"], "ZONE ARTISANALE 2 GUILLEME");
    assert_eq!(rec["co_head_office_country"], "FRANCE");
    assert_eq!(rec["co_legal_form"], "SAS SOCIETE PAR ACTIONS SIMPLIFIEE");
    assert!(rec.get("co_validation_status").is_none());
    assert!(kinds(&outcome, Severity::Error).is_empty());
    assert!(outcome.statuses[0].is_valid);
}

#[test]
fn eight_digit_siren_gets_leading_zero_and_fails_checksum() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::Companies,
        json!([{"co_id": 1, "co_business_name": "ACME", "co_siren": "51370338", "fk_us": 3}]),
    );

    assert_eq!(outcome.records[0]["co_siren"], "051370338");
    assert_eq!(outcome.errors.of_kind("siren_missing_leading_zero").count(), 1);
    assert_eq!(kinds(&outcome, Severity::Error), vec!["invalid_siren_checksum"]);
    let status = &outcome.statuses[0];
    assert_eq!(status.failed_fields().collect::<Vec<_>>(), vec!["co_siren"]);
}

#[test]
fn lowercase_rna_is_uppercased() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::Organizations,
        json!([{"org_id": 9, "org_name": "Les Amis", "org_rna": "w595026866", "fk_us": 1}]),
    );

    assert_eq!(outcome.records[0]["org_rna"], "W595026866");
    assert_eq!(outcome.errors.of_kind("rna_cleaning").count(), 1);
    assert!(kinds(&outcome, Severity::Warning).is_empty());
}

#[test]
fn logistic_street_line_is_decomposed() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::LogisticAddresses,
        json!([{
            "la_id": 12,
            "la_street": "87 RUE DE LA COMMANDERIE, 59500 DOUAI",
            "la_postal_code": "",
            "la_city": null,
            "fk_co": 175,
            "fk_us": 1
        }]),
    );

    let rec = &outcome.records[0];
    assert_eq!(rec["la_house_number"], "87");
    assert_eq!(rec["la_street"], "RUE DE LA COMMANDERIE");
    assert_eq!(rec["la_postal_code"], "59500");
    assert_eq!(rec["la_city"], "DOUAI");
    assert!(kinds(&outcome, Severity::Error).is_empty());
}

#[test]
fn transports_deduplicate_imports_and_denominations() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::Transports,
        json!([
            {"tra_id": 2, "tra_denomination": "Geodis", "stock_import": [190, 190, 225, 350]},
            {"tra_id": 3, "tra_denomination": "GÉODIS", "stock_import": [410, 510]}
        ]),
    );

    assert_eq!(outcome.records[0]["stock_import"], json!([190, 225, 350]));
    assert_eq!(outcome.records[0]["tra_denomination"], "GEODIS");
    assert_eq!(outcome.records[1]["tra_denomination"], "GEODIS");
    let duplicates: Vec<_> = outcome.errors.of_kind("duplicate_denomination").collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].entity_id, Some(3));
    assert!(duplicates[0].message.contains("tra_id 2"));
}

#[test]
fn stock_commission_is_renamed_and_converted() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::Stocks,
        json!([{"st_id": 5, "st_commission_%": 1.25, "fk_us": 1}]),
    );

    let rec = &outcome.records[0];
    assert_eq!(rec["st_commission_percent"], json!(0.0125));
    assert!(rec.get("st_commission_%").is_none());
    let conversions: Vec<_> = outcome.errors.of_kind("value_conversion").collect();
    assert_eq!(conversions.len(), 1);
    assert_eq!(conversions[0].original, Some(json!(1.25)));
}

#[test]
fn cardinality_and_keys_survive_bad_input() {
    let standards = standards();
    let input = json!([
        {"tra_id": 1, "tra_denomination": "A", "stock_import": null},
        "not a record",
        {"tra_id": "x", "tra_denomination": "B"},
        {"tra_denomination": "C"},
        {"tra_id": 1, "tra_denomination": "D", "stock_import": "7"}
    ]);
    let outcome = run(&standards, EntityType::Transports, input.clone());

    assert_eq!(outcome.records.len(), 5);
    for (rec, raw) in outcome.records.iter().zip(input.as_array().unwrap()) {
        let raw_id = raw.get("tra_id").cloned().unwrap_or(Value::Null);
        assert_eq!(rec["tra_id"], raw_id);
        assert!(rec["stock_import"].is_array());
    }
    assert_eq!(outcome.records[4]["stock_import"], json!([7]));
    for kind in [
        "record_not_object",
        "invalid_identifier_type",
        "missing_primary_key",
        "duplicate_primary_key",
    ] {
        assert_eq!(outcome.errors.of_kind(kind).count(), 1, "{kind}");
    }
}

#[test]
fn output_is_a_fixed_point() {
    let standards = standards();
    let first = run(
        &standards,
        EntityType::Companies,
        json!([{
            "co_id": 175,
            "co_business_name": " lucas  france ",
            "co_siren": "513703389",
            "co_vat": "fr 78 513 703 389",
            "co_head_office_address": "87 rue de la Commanderie, 59500 Douai",
            "co_creation_date": "14/03/2021",
            "co_is_active": "oui",
            "fk_us": 0
        }]),
    );
    assert!(kinds(&first, Severity::Error).is_empty());

    let second = run(&standards, EntityType::Companies, as_values(&first.records));
    assert_eq!(second.records, first.records);
    assert!(kinds(&second, Severity::Warning).is_empty());
    assert!(kinds(&second, Severity::Error).is_empty());
}

#[test]
fn every_required_failure_has_an_error_for_the_record() {
    let standards = standards();
    let outcome = run(
        &standards,
        EntityType::StockImports,
        json!([{"si_id": 8, "si_import_date": "not a date", "fk_us": 1}]),
    );

    let status = &outcome.statuses[0];
    assert!(!status.is_valid);
    for field in status.failed_fields() {
        assert!(
            outcome
                .errors
                .iter()
                .any(|obs| obs.is_error() && obs.entity_id == Some(8) && obs.field.as_deref() == Some(field)),
            "no error observation for {field}"
        );
    }
    assert_eq!(outcome.errors.of_kind("invalid_date").count(), 1);
}

#[test]
fn targeted_patch_values_drive_validation_status() {
    let standards = standards();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("companies_patches.json"),
        json!([{"co_id": 175, "patches": {
            "co_siren": "51370338",
            "co_business_name": " lucas géodis ",
            "fk_us": "abc"
        }}])
        .to_string(),
    )
    .unwrap();
    let outcome = run_with_patches(
        &standards,
        EntityType::Companies,
        json!([{"co_id": 175, "co_business_name": "LUCAS FRANCE", "co_siren": "513703389", "fk_us": 0}]),
        dir.path(),
    );

    let rec = &outcome.records[0];
    assert_eq!(rec["co_siren"], "051370338");
    assert_eq!(rec["co_business_name"], "LUCAS GEODIS");
    let status = &outcome.statuses[0];
    assert!(!status.is_valid);
    let failed: Vec<_> = status.failed_fields().collect();
    assert!(failed.contains(&"co_siren"), "{failed:?}");
    assert!(failed.contains(&"fk_us"), "{failed:?}");
    for field in failed {
        assert!(
            outcome
                .errors
                .iter()
                .any(|obs| obs.is_error() && obs.entity_id == Some(175) && obs.field.as_deref() == Some(field)),
            "no error observation for {field}"
        );
    }
}

#[test]
fn large_percentages_are_converted_once() {
    let standards = standards();
    let first = run(
        &standards,
        EntityType::Stocks,
        json!([{"st_id": 5, "st_name": "Entrepot", "st_commission_%": 250, "fk_us": 1}]),
    );
    assert_eq!(first.records[0]["st_commission_percent"], json!(2.5));

    let second = run(&standards, EntityType::Stocks, as_values(&first.records));
    assert_eq!(second.records[0]["st_commission_percent"], json!(2.5));
    assert_eq!(second.records, first.records);
    assert_eq!(second.errors.of_kind("value_conversion").count(), 0);
}
