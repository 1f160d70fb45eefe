//! French intra-community VAT number: `FR` + 2-digit key + SIREN.

use std::sync::LazyLock;

use regex::Regex;

use super::{Finding, Validated};

static FRENCH_VAT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FR\d{11}$").expect("Invalid French VAT regex"));

/// Expected key for a SIREN: `(12 + 3 * (siren mod 97)) mod 97`.
pub fn vat_key(siren: u64) -> u64 {
    (12 + 3 * (siren % 97)) % 97
}

/// Builds the French VAT number for a nine-digit SIREN.
pub fn vat_from_siren(siren: &str) -> Option<String> {
    if siren.len() != 9 {
        return None;
    }
    let number: u64 = siren.parse().ok()?;
    Some(format!("FR{:02}{siren}", vat_key(number)))
}

/// SIREN embedded in a well-formed French VAT number.
pub fn embedded_siren(vat: &str) -> Option<&str> {
    FRENCH_VAT_REGEX.is_match(vat).then(|| &vat[4..])
}

/// Uppercases, rewrites the accepted prefix variants and removes separators.
fn canonical_form(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    // Prefixes are matched with their hyphen before inner hyphens go.
    let rewritten = ["FR-", "F-", "+33-", "+33"]
        .into_iter()
        .find_map(|prefix| compact.strip_prefix(prefix))
        .map_or_else(|| compact.clone(), |rest| format!("FR{rest}"));
    rewritten.replace('-', "")
}

/// Cleans and checks a VAT number.
pub fn validate_vat(raw: &str) -> Validated {
    let trimmed = raw.trim();
    let mut cleaned = canonical_form(trimmed);
    let mut outcome = Validated::new(cleaned.clone());
    if cleaned != trimmed {
        outcome.push(Finding::info(
            "vat_cleaning",
            format!("normalized VAT '{trimmed}' to '{cleaned}'"),
        ));
    }
    if cleaned.len() == 11 && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        cleaned = format!("FR{cleaned}");
        outcome.value = cleaned.clone();
        outcome.push(Finding::info(
            "vat_synthesized",
            "added FR country code to 11-digit VAT",
        ));
    }
    if !cleaned.starts_with("FR") {
        let foreign = cleaned.len() > 2 && cleaned.bytes().take(2).all(|b| b.is_ascii_uppercase());
        if foreign {
            outcome.push(Finding::info(
                "non_french_vat",
                format!("VAT country code {} is not FR; skipped", &cleaned[..2]),
            ));
        } else {
            outcome.push(Finding::error(
                "invalid_vat_format",
                "VAT must be FR followed by 11 digits",
            ));
        }
        return outcome;
    }
    if !FRENCH_VAT_REGEX.is_match(&cleaned) {
        outcome.push(Finding::error(
            "invalid_vat_format",
            format!("VAT {cleaned} must be FR followed by 11 digits"),
        ));
        return outcome;
    }
    let key: u64 = cleaned[2..4].parse().unwrap_or(u64::MAX);
    let siren: u64 = cleaned[4..].parse().unwrap_or_default();
    let expected = vat_key(siren);
    if key != expected {
        outcome.push(Finding::error(
            "invalid_vat_checksum",
            format!("VAT key {} does not match expected {expected:02}", &cleaned[2..4]),
        ));
    }
    outcome
}
