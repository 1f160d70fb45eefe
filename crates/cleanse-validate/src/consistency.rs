//! Identifier consistency between SIREN, SIRET and VAT.

use crate::identifiers::siren::SIREN_LENGTH;
use crate::identifiers::siret::{SIRET_LENGTH, siret_checksum_valid};
use crate::identifiers::vat::embedded_siren;
use crate::identifiers::Finding;

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Compares a SIRET's first nine digits with the record's SIREN.
pub fn check_siret_siren(siren: &str, siret: &str) -> Option<Finding> {
    if !is_digits(siren, SIREN_LENGTH) || !is_digits(siret, SIRET_LENGTH) {
        return None;
    }
    (&siret[..SIREN_LENGTH] != siren).then(|| {
        Finding::error(
            "siret_siren_mismatch",
            format!("SIRET {siret} does not start with SIREN {siren}"),
        )
    })
}

/// Compares the SIREN embedded in a French VAT number with the record's SIREN.
pub fn check_vat_siren(siren: &str, vat: &str) -> Option<Finding> {
    if !is_digits(siren, SIREN_LENGTH) {
        return None;
    }
    let embedded = embedded_siren(vat)?;
    (embedded != siren).then(|| {
        Finding::error(
            "vat_siren_mismatch",
            format!("VAT {vat} embeds SIREN {embedded}, record has {siren}"),
        )
    })
}

/// SIREN taken from a well-formed SIRET with a valid checksum.
pub fn siren_from_siret(siret: &str) -> Option<String> {
    (is_digits(siret, SIRET_LENGTH) && siret_checksum_valid(siret))
        .then(|| siret[..SIREN_LENGTH].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_identifiers_pass() {
        assert!(check_siret_siren("513703389", "51370338900017").is_none());
        assert!(check_vat_siren("513703389", "FR78513703389").is_none());
    }

    #[test]
    fn mismatches_are_errors() {
        let finding = check_siret_siren("513703389", "44306184100047").unwrap();
        assert_eq!(finding.kind, "siret_siren_mismatch");
        let finding = check_vat_siren("443061841", "FR78513703389").unwrap();
        assert_eq!(finding.kind, "vat_siren_mismatch");
    }

    #[test]
    fn malformed_values_are_left_to_their_validators() {
        assert!(check_siret_siren("5137", "51370338900017").is_none());
        assert!(check_vat_siren("513703389", "DE123456789").is_none());
    }

    #[test]
    fn derive_siren() {
        assert_eq!(
            siren_from_siret("51370338900017").as_deref(),
            Some("513703389")
        );
        assert_eq!(siren_from_siret("51370338900018"), None);
    }
}
