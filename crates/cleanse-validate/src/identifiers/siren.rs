//! SIREN: nine-digit French business registry number.

use super::{Finding, Validated, digits_only, luhn_valid};

pub const SIREN_LENGTH: usize = 9;

/// Cleans and checks a SIREN.
///
/// Non-digits are stripped; an eight-digit value is assumed to have lost its
/// leading zero. The result must be nine digits passing the Luhn check.
pub fn validate_siren(raw: &str) -> Validated {
    let trimmed = raw.trim();
    let mut digits = digits_only(trimmed);
    let mut outcome = Validated::new(digits.clone());
    if digits != trimmed {
        outcome.push(Finding::info(
            "siren_cleaning",
            format!("removed non-digit characters from '{trimmed}'"),
        ));
    }
    if digits.len() == SIREN_LENGTH - 1 {
        digits.insert(0, '0');
        outcome.value = digits.clone();
        outcome.push(Finding::warning(
            "siren_missing_leading_zero",
            "SIREN had 8 digits; restored leading zero",
        ));
    }
    if digits.len() != SIREN_LENGTH {
        outcome.push(Finding::error(
            "invalid_siren_format",
            format!("SIREN must have 9 digits, found {}", digits.len()),
        ));
        return outcome;
    }
    if !luhn_valid(&digits) {
        outcome.push(Finding::error(
            "invalid_siren_checksum",
            format!("SIREN {digits} fails the Luhn checksum"),
        ));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_siren_is_untouched() {
        let outcome = validate_siren("513703389");
        assert_eq!(outcome.value, "513703389");
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn spaced_siren_is_compacted() {
        let outcome = validate_siren("513 703 389");
        assert_eq!(outcome.value, "513703389");
        assert!(outcome.has("siren_cleaning"));
        assert!(outcome.is_valid());
    }

    #[test]
    fn eight_digits_regain_leading_zero_then_fail_checksum() {
        let outcome = validate_siren("51370338");
        assert_eq!(outcome.value, "051370338");
        let kinds: Vec<&str> = outcome.findings.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec!["siren_missing_leading_zero", "invalid_siren_checksum"]
        );
        assert!(!outcome.is_valid());
    }

    #[test]
    fn wrong_length_is_a_format_error() {
        let outcome = validate_siren("1234");
        assert!(outcome.has("invalid_siren_format"));
        assert!(!outcome.has("invalid_siren_checksum"));
    }
}
