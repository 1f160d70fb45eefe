//! Date parsing to ISO `YYYY-MM-DD`.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Date formats in priority order. The first one that yields a valid
/// calendar date wins, so day-first readings beat month-first ones.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime forms whose date part is kept.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a date in any accepted format.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    {
        return Some(date);
    }
    let without_zone = text.trim_end_matches('Z');
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(without_zone, format).ok())
        .map(|datetime| datetime.date())
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Result of normalizing one non-blank date value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    /// Already ISO.
    Unchanged(String),
    /// Rewritten to ISO.
    Normalized(String),
    Invalid,
}

/// Normalizes a JSON date value to ISO text.
pub fn normalize_date(value: &Value) -> DateOutcome {
    let Some(text) = value.as_str() else {
        return DateOutcome::Invalid;
    };
    match parse_date(text) {
        Some(date) => {
            let iso = format_iso(date);
            if iso == text {
                DateOutcome::Unchanged(iso)
            } else {
                DateOutcome::Normalized(iso)
            }
        }
        None => DateOutcome::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepted_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 14);
        assert_eq!(parse_date("2021-03-14"), expected);
        assert_eq!(parse_date("14/03/2021"), expected);
        assert_eq!(parse_date("14.03.2021"), expected);
        assert_eq!(parse_date("2021/03/14"), expected);
        assert_eq!(parse_date("03/14/2021"), expected);
        assert_eq!(parse_date("2021-03-14T08:30:00"), expected);
        assert_eq!(parse_date("2021-03-14 08:30:00.250Z"), expected);
    }

    #[test]
    fn day_first_wins_when_ambiguous() {
        assert_eq!(parse_date("04/05/2020"), NaiveDate::from_ymd_opt(2020, 5, 4));
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_date("31/02/2020"), None);
        assert_eq!(parse_date("2020-13-01"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn normalize_reports_rewrites() {
        assert_eq!(
            normalize_date(&json!("2020-01-31")),
            DateOutcome::Unchanged("2020-01-31".to_string())
        );
        assert_eq!(
            normalize_date(&json!("31/01/2020")),
            DateOutcome::Normalized("2020-01-31".to_string())
        );
        assert_eq!(normalize_date(&json!(20200131)), DateOutcome::Invalid);
    }
}
