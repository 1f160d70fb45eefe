use cleanse_standards::{DepartmentTable, IdentifierKind};
use cleanse_validate::identifiers::vat::vat_from_siren;
use cleanse_validate::{dedup_integer_array, luhn_valid, validate_identifier};
use proptest::prelude::*;
use serde_json::{Value, json};

fn kinds() -> impl Strategy<Value = IdentifierKind> {
    prop_oneof![
        Just(IdentifierKind::Siren),
        Just(IdentifierKind::Siret),
        Just(IdentifierKind::Vat),
        Just(IdentifierKind::Rna),
        Just(IdentifierKind::PostalCode),
        Just(IdentifierKind::Email),
        Just(IdentifierKind::Phone),
    ]
}

/// Appends the Luhn check digit to `body`.
fn with_check_digit(body: &str) -> String {
    (0..10)
        .map(|d| format!("{body}{d}"))
        .find(|candidate| luhn_valid(candidate))
        .unwrap()
}

proptest! {
    #[test]
    fn validators_are_deterministic(kind in kinds(), raw in "[ a-zA-Z0-9.+@-]{0,20}") {
        let departments = DepartmentTable::embedded().unwrap();
        let first = validate_identifier(kind, &raw, &departments);
        let second = validate_identifier(kind, &raw, &departments);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn cleaned_values_are_fixed_points(kind in kinds(), raw in "[ 0-9.-]{0,16}") {
        let departments = DepartmentTable::embedded().unwrap();
        let once = validate_identifier(kind, &raw, &departments);
        let twice = validate_identifier(kind, &once.value, &departments);
        prop_assert_eq!(&twice.value, &once.value);
    }

    #[test]
    fn generated_identifiers_validate(body in "[1-9][0-9]{7}", nic in "[0-9]{4}") {
        let departments = DepartmentTable::embedded().unwrap();
        let siren = with_check_digit(&body);
        prop_assume!(siren != "356000000");
        prop_assert!(validate_identifier(IdentifierKind::Siren, &siren, &departments).is_valid());

        let siret = with_check_digit(&format!("{siren}{nic}"));
        prop_assert!(validate_identifier(IdentifierKind::Siret, &siret, &departments).is_valid());

        let vat = vat_from_siren(&siren).unwrap();
        let outcome = validate_identifier(IdentifierKind::Vat, &vat, &departments);
        prop_assert!(outcome.findings.is_empty());
    }

    #[test]
    fn integer_dedup_is_idempotent(items in prop::collection::vec(0i64..20, 0..30)) {
        let values: Vec<Value> = items.iter().map(|n| json!(n)).collect();
        let once = dedup_integer_array(&values);
        let twice = dedup_integer_array(&once.items);
        prop_assert_eq!(&twice.items, &once.items);
        prop_assert!(!twice.changed());
    }
}
