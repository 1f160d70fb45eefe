//! E-mail addresses and French phone numbers.

use std::sync::LazyLock;

use regex::Regex;

use super::{Finding, Validated};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+'-]+@[a-z0-9-]+(\.[a-z0-9-]+)*\.[a-z]{2,}$")
        .expect("Invalid e-mail regex")
});

pub fn validate_email(raw: &str) -> Validated {
    let trimmed = raw.trim();
    let cleaned: String = trimmed
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let mut outcome = Validated::new(cleaned.clone());
    if cleaned != trimmed {
        outcome.push(Finding::info(
            "email_cleaning",
            format!("normalized e-mail '{trimmed}' to '{cleaned}'"),
        ));
    }
    if !EMAIL_REGEX.is_match(&cleaned) {
        outcome.push(Finding::warning(
            "invalid_email",
            format!("'{cleaned}' is not a valid e-mail address"),
        ));
    }
    outcome
}

/// Groups a ten-digit number as `0X XX XX XX XX`.
fn group_pairs(digits: &str) -> String {
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduces a French phone number to digits, maps `+33`/`0033` to a leading
/// zero and formats ten-digit numbers in pairs.
pub fn validate_phone(raw: &str) -> Validated {
    let trimmed = raw.trim();
    let international = trimmed.starts_with('+');
    let mut digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if let Some(rest) = digits.strip_prefix("0033") {
        digits = format!("0{}", rest.trim_start_matches('0'));
    } else if international {
        if let Some(rest) = digits.strip_prefix("33") {
            digits = format!("0{}", rest.trim_start_matches('0'));
        }
    }

    if digits.len() != 10 || !digits.starts_with('0') {
        let mut outcome = Validated::new(trimmed);
        outcome.push(Finding::warning(
            "invalid_phone",
            format!("'{trimmed}' is not a 10-digit French phone number"),
        ));
        return outcome;
    }

    let formatted = group_pairs(&digits);
    let mut outcome = Validated::new(formatted.clone());
    if formatted != trimmed {
        outcome.push(Finding::info(
            "phone_cleaning",
            format!("formatted phone '{trimmed}' as '{formatted}'"),
        ));
    }
    outcome
}
