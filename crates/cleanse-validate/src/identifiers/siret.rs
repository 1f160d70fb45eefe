//! SIRET: fourteen-digit establishment number (SIREN + NIC).

use super::{Finding, Validated, digit_sum, digits_only, luhn_valid};

pub const SIRET_LENGTH: usize = 14;

/// SIREN of La Poste, whose establishments do not follow the Luhn rule.
pub const LA_POSTE_SIREN: &str = "356000000";

/// Checksum rule for a fourteen-digit SIRET.
pub fn siret_checksum_valid(siret: &str) -> bool {
    if siret.starts_with(LA_POSTE_SIREN) {
        siret.len() == SIRET_LENGTH && digit_sum(siret) % 5 == 0
    } else {
        luhn_valid(siret)
    }
}

/// Cleans and checks a SIRET.
pub fn validate_siret(raw: &str) -> Validated {
    let trimmed = raw.trim();
    let mut digits = digits_only(trimmed);
    let mut outcome = Validated::new(digits.clone());
    if digits != trimmed {
        outcome.push(Finding::info(
            "siret_cleaning",
            format!("removed non-digit characters from '{trimmed}'"),
        ));
    }
    if digits.len() == SIRET_LENGTH - 1 {
        digits.insert(0, '0');
        outcome.value = digits.clone();
        outcome.push(Finding::info(
            "siret_missing_leading_zero",
            "SIRET had 13 digits; restored leading zero",
        ));
    }
    if digits.len() != SIRET_LENGTH {
        outcome.push(Finding::error(
            "invalid_siret_format",
            format!("SIRET must have 14 digits, found {}", digits.len()),
        ));
        return outcome;
    }
    if !siret_checksum_valid(&digits) {
        outcome.push(Finding::error(
            "invalid_siret_checksum",
            format!("SIRET {digits} fails its checksum"),
        ));
    }
    outcome
}
