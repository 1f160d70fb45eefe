//! French postal codes.

use cleanse_standards::DepartmentTable;

use super::{Finding, Validated, digits_only};

/// Compacts a postal code, restores a lost leading zero and checks the
/// department prefix. Failures are warnings; the cleaned value is kept.
pub fn validate_postal_code(raw: &str, departments: &DepartmentTable) -> Validated {
    let trimmed = raw.trim();
    let mut digits = digits_only(trimmed);
    let mut outcome = Validated::new(digits.clone());
    if digits != trimmed {
        outcome.push(Finding::info(
            "postal_code_reformatted",
            format!("compacted postal code '{trimmed}' to '{digits}'"),
        ));
    }
    if digits.len() == 4 {
        digits.insert(0, '0');
        outcome.value = digits.clone();
        outcome.push(Finding::info(
            "postal_code_missing_leading_zero",
            "postal code had 4 digits; restored leading zero",
        ));
    }
    if digits.len() != 5 {
        outcome.push(Finding::warning(
            "invalid_postal_code",
            format!("postal code must have 5 digits, found {}", digits.len()),
        ));
        return outcome;
    }
    if !departments.is_valid_postal_code(&digits) {
        outcome.push(Finding::warning(
            "invalid_french_department",
            format!("postal code {digits} does not start with a French department"),
        ));
    }
    outcome
}
