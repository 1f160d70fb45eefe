//! Reference vocabularies for French addresses and company names.

/// Street-type keywords, accent-free and uppercase.
pub const STREET_TYPES: &[&str] = &[
    "RUE",
    "AVENUE",
    "AV",
    "BOULEVARD",
    "BD",
    "ALLEE",
    "ALLEES",
    "PLACE",
    "COURS",
    "CHEMIN",
    "IMPASSE",
    "QUAI",
    "SQUARE",
    "ROUTE",
    "RTE",
    "SENTIER",
    "PASSAGE",
];

/// Business-zone prefixes that open an address line.
pub const BUSINESS_ZONE_PREFIXES: &[&str] = &["ZAC", "ZA", "ZI", "ZONE", "PARC"];

/// Repetition suffixes that belong to a house number (`11 BIS`).
pub const NUMBER_SUFFIXES: &[&str] = &["BIS", "TER", "QUATER"];

/// Address values that mean "nothing here".
pub const EMPTY_ADDRESS_SENTINELS: &[&str] = &["0", ".", "/", "-"];

/// Abbreviations whose points survive punctuation cleaning of names.
pub const NAME_PUNCTUATION_EXCEPTIONS: &[&str] = &["S.A.R.L.", "S.A.S.", "S.A.", "STE.", "ST.", "CIE."];

/// Abbreviations whose points survive punctuation cleaning of address lines.
pub const ADDRESS_PUNCTUATION_EXCEPTIONS: &[&str] = &["ST.", "STE.", "BD.", "AV."];

/// True when `word` is a street-type keyword, ignoring case and a trailing point.
pub fn is_street_type(word: &str) -> bool {
    let word = word.trim_end_matches('.');
    STREET_TYPES
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// True when any whitespace-separated word of `text` is a street-type keyword.
pub fn contains_street_type(text: &str) -> bool {
    text.split_whitespace().any(is_street_type)
}

/// Business-zone prefix opening `text`, matched as a whole word.
pub fn business_zone_prefix(text: &str) -> Option<&'static str> {
    let first = text.split_whitespace().next()?;
    BUSINESS_ZONE_PREFIXES
        .iter()
        .copied()
        .find(|prefix| prefix.eq_ignore_ascii_case(first))
}

pub fn is_number_suffix(word: &str) -> bool {
    NUMBER_SUFFIXES
        .iter()
        .any(|suffix| suffix.eq_ignore_ascii_case(word))
}

pub fn is_empty_sentinel(value: &str) -> bool {
    EMPTY_ADDRESS_SENTINELS.contains(&value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_types_match_whole_words() {
        assert!(contains_street_type("41 RUE MERCIER"));
        assert!(contains_street_type("12 av. des Lilas"));
        assert!(!contains_street_type("LOGISTICS OPERATIONS"));
        assert!(!contains_street_type("RUELLE"));
    }

    #[test]
    fn zone_prefix_is_a_whole_word() {
        assert_eq!(business_zone_prefix("ZAC DES PINS 3 RUE A"), Some("ZAC"));
        assert_eq!(business_zone_prefix("ZONE ARTISANALE"), Some("ZONE"));
        assert_eq!(business_zone_prefix("ZAPPA 3 RUE"), None);
    }

    #[test]
    fn sentinels() {
        assert!(is_empty_sentinel(" / "));
        assert!(!is_empty_sentinel("0A"));
    }
}
