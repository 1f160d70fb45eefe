//! RNA: French association register number.

use std::sync::LazyLock;

use regex::Regex;

use super::{Finding, Validated};

static RNA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^W\d{1,2}[0-9A-Z]\d{6,7}$").expect("Invalid RNA regex"));

/// Uppercases and compacts an RNA number, then checks its shape. RNA
/// numbers carry no checksum.
pub fn validate_rna(raw: &str) -> Validated {
    let trimmed = raw.trim();
    let cleaned: String = trimmed
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let mut outcome = Validated::new(cleaned.clone());
    if cleaned != trimmed {
        outcome.push(Finding::info(
            "rna_cleaning",
            format!("normalized RNA '{trimmed}' to '{cleaned}'"),
        ));
    }
    if !RNA_REGEX.is_match(&cleaned) {
        outcome.push(Finding::error(
            "invalid_rna_format",
            format!("RNA {cleaned} must be W followed by 9 department and serial characters"),
        ));
    }
    outcome
}
