use cleanse_model::EntityType;
use cleanse_standards::{
    FieldType, IdentifierKind, StandardsError, Standards, load_schema, parse_schema,
};

fn standards() -> Standards {
    Standards::load_from(None).expect("embedded standards load")
}

#[test]
fn every_entity_has_a_valid_embedded_schema() {
    let standards = standards();
    for entity in EntityType::all() {
        let schema = standards.schema(*entity).expect("schema present");
        assert_eq!(schema.entity, *entity);
        assert!(schema.has_field(&schema.primary_key));
        assert!(schema.field(&schema.primary_key).unwrap().required);
        assert!(schema.validation_status_field.ends_with("_validation_status"));
        assert!(!schema.has_field(&schema.validation_status_field));
    }
}

#[test]
fn companies_declarations() {
    let standards = standards();
    let schema = standards.schema(EntityType::Companies).unwrap();
    let required: Vec<&str> = schema.required_fields().map(|f| f.name.as_str()).collect();
    insta::assert_debug_snapshot!(required, @r#"
    [
        "co_id",
        "co_business_name",
        "fk_us",
    ]
    "#);
    let unique: Vec<&str> = schema.unique_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(unique, vec!["co_code_ent"]);
    assert_eq!(schema.field("co_legal_form").unwrap().max_length, Some(100));
    assert!(schema.rename.is_empty());
    assert_eq!(
        schema.identifier_field(IdentifierKind::Siren).unwrap().name,
        "co_siren"
    );
    assert_eq!(schema.patches.len(), 2);
}

#[test]
fn stocks_rename_percent_field() {
    let standards = standards();
    let schema = standards.schema(EntityType::Stocks).unwrap();
    let field = schema.field_for_key("st_commission_%").unwrap();
    assert_eq!(field.name, "st_commission_percent");
    assert_eq!(field.field_type, FieldType::Percent);
}

#[test]
fn transports_stock_import_is_a_set() {
    let standards = standards();
    let schema = standards.schema(EntityType::Transports).unwrap();
    let field = schema.field("stock_import").unwrap();
    assert!(field.set_valued);
    assert_eq!(field.field_type, FieldType::IntegerArray);
    assert_eq!(schema.unprefixed("tra_denomination"), "denomination");
}

#[test]
fn override_directory_replaces_one_schema() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("transports.toml"),
        r#"
entity = "transports"
label = "Carriers"
primary_key = "tra_id"
prefix = "tra"
validation_status_field = "tra_validation_status"

[[fields]]
name = "tra_id"
type = "integer"
required = true
"#,
    )
    .unwrap();

    let standards = Standards::load_from(Some(dir.path())).unwrap();
    let transports = standards.loaded(EntityType::Transports).unwrap();
    assert_eq!(transports.schema.label, "Carriers");
    assert!(transports.origin.ends_with("transports.toml"));
    let companies = standards.loaded(EntityType::Companies).unwrap();
    assert_eq!(companies.origin, "embedded:companies.toml");
    assert_eq!(companies.digest.len(), 64);
}

#[test]
fn override_with_wrong_entity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("stocks.toml"),
        r#"
entity = "transports"
label = "Wrong"
primary_key = "tra_id"
prefix = "tra"
validation_status_field = "tra_validation_status"
fields = []
"#,
    )
    .unwrap();
    let err = load_schema(EntityType::Stocks, Some(dir.path())).unwrap_err();
    assert!(matches!(err, StandardsError::EntityMismatch { .. }));
}

#[test]
fn malformed_toml_reports_origin() {
    let err = parse_schema(EntityType::Stocks, "entity = ", "inline").unwrap_err();
    assert!(err.to_string().contains("inline"));
}
