//! Free-form French address parser.
//!
//! Splits a single address line into house number, street, complement,
//! postal code and city. Shapes are tried in order:
//!
//! 1. `NAME, REST` where `NAME` has no digits and no street keyword: `NAME`
//!    is a complement and `REST` is parsed recursively.
//! 2. A business-zone prefix (`ZA`, `ZAC`, `ZI`, `ZONE ...`, `PARC ...`)
//!    followed by a numbered street: the zone becomes the complement.
//! 3. A postal code (five digits, or two groups of 2-3 digits with a valid
//!    department prefix): text before it is number and street, text after it
//!    is the city.
//! 4. Leading house number followed by the street.

use cleanse_standards::DepartmentTable;
use cleanse_standards::keywords::{
    business_zone_prefix, contains_street_type, is_number_suffix, is_street_type,
};

/// Which rule decomposed the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressShape {
    CompanyPrefixed,
    BusinessZone,
    WithPostalCode,
    NumberAndStreet,
    #[default]
    StreetOnly,
}

impl AddressShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyPrefixed => "company_prefixed",
            Self::BusinessZone => "business_zone",
            Self::WithPostalCode => "with_postal_code",
            Self::NumberAndStreet => "number_and_street",
            Self::StreetOnly => "street_only",
        }
    }
}

/// Address components; empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub shape: AddressShape,
    pub number: String,
    pub street: String,
    pub additional: String,
    pub postal_code: String,
    pub city: String,
}

impl ParsedAddress {
    /// True when nothing beyond a house number could be extracted.
    pub fn is_unparsed(&self) -> bool {
        self.street.is_empty() && self.postal_code.is_empty() && self.city.is_empty()
    }
}

pub struct AddressParser<'a> {
    departments: &'a DepartmentTable,
}

impl<'a> AddressParser<'a> {
    pub fn new(departments: &'a DepartmentTable) -> Self {
        Self { departments }
    }

    pub fn parse(&self, input: &str) -> ParsedAddress {
        let text = input
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let text = text.trim_matches(|c: char| c == ',' || c.is_whitespace());
        if text.is_empty() {
            return ParsedAddress::default();
        }
        if let Some(parsed) = self.company_prefixed(text) {
            return parsed;
        }
        let flat = text.replace(',', " ");
        let tokens: Vec<&str> = flat.split_whitespace().collect();
        if let Some(parsed) = self.business_zone(&tokens) {
            return parsed;
        }
        if let Some(parsed) = self.with_postal_code(&tokens) {
            return parsed;
        }
        number_and_street(&tokens)
    }

    fn company_prefixed(&self, text: &str) -> Option<ParsedAddress> {
        let (name, rest) = text.split_once(',')?;
        let name = name.trim();
        let rest = rest.trim_matches(|c: char| c == ',' || c.is_whitespace());
        if name.is_empty()
            || rest.is_empty()
            || name.chars().any(|c| c.is_ascii_digit())
            || contains_street_type(name)
        {
            return None;
        }
        let mut parsed = self.parse(rest);
        parsed.additional = join_complements(name, &parsed.additional);
        parsed.shape = AddressShape::CompanyPrefixed;
        Some(parsed)
    }

    fn business_zone(&self, tokens: &[&str]) -> Option<ParsedAddress> {
        business_zone_prefix(tokens.first()?)?;
        let split = (1..tokens.len()).find(|&idx| {
            tokens[idx].starts_with(|c: char| c.is_ascii_digit())
                && tokens[idx + 1..].iter().any(|token| is_street_type(token))
        })?;
        let zone = tokens[..split].join(" ");
        let mut parsed = self.parse(&tokens[split..].join(" "));
        parsed.additional = join_complements(&zone, &parsed.additional);
        parsed.shape = AddressShape::BusinessZone;
        Some(parsed)
    }

    /// Last postal-code candidate as `(start, end, code)` token positions.
    fn find_postal_code(&self, tokens: &[&str]) -> Option<(usize, usize, String)> {
        let mut found = None;
        for start in 0..tokens.len() {
            for width in [1, 2] {
                let end = start + width;
                // A leading digit pair ("12 345 LIEU DIT") is a house number
                // followed by text, not a postal code.
                if end > tokens.len() || (width == 2 && start == 0) {
                    continue;
                }
                let Some(code) = postal_candidate(&tokens[start..end]) else {
                    continue;
                };
                if !self.departments.is_valid_postal_code(&code) {
                    continue;
                }
                // "12 150 RUE ..." is a house number, not a postal code.
                if tokens.get(end).is_some_and(|next| is_street_type(next)) {
                    continue;
                }
                found = Some((start, end, code));
            }
        }
        found
    }

    fn with_postal_code(&self, tokens: &[&str]) -> Option<ParsedAddress> {
        let (start, end, code) = self.find_postal_code(tokens)?;
        let mut parsed = number_and_street(&tokens[..start]);
        parsed.postal_code = code;
        parsed.city = tokens[end..].join(" ");
        parsed.shape = AddressShape::WithPostalCode;
        Some(parsed)
    }
}

fn all_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Five-digit code spelled by one token or two digit groups (`38 170`).
fn postal_candidate(tokens: &[&str]) -> Option<String> {
    match tokens {
        [single] if single.len() == 5 && all_digits(single) => Some((*single).to_string()),
        [head, tail]
            if all_digits(head)
                && all_digits(tail)
                && matches!((head.len(), tail.len()), (2, 3) | (3, 2)) =>
        {
            Some(format!("{head}{tail}"))
        }
        _ => None,
    }
}

fn is_single_letter(token: &str) -> bool {
    token.len() == 1 && token.bytes().all(|b| b.is_ascii_alphabetic())
}

/// `199-201` or `12-14B`.
fn is_number_range(tail: &str) -> bool {
    tail.strip_prefix('-').is_some_and(|upper| {
        let digits_end = upper
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(upper.len());
        digits_end > 0 && upper[digits_end..].len() <= 1
    })
}

/// Leading house number, then street.
fn number_and_street(tokens: &[&str]) -> ParsedAddress {
    let mut parsed = ParsedAddress::default();
    let Some((first, rest)) = tokens.split_first() else {
        return parsed;
    };
    let digits_end = first
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(first.len());
    if digits_end == 0 {
        parsed.street = tokens.join(" ");
        return parsed;
    }

    let (digits, tail) = first.split_at(digits_end);
    let mut street_head = None;
    let mut consumed = 0;
    parsed.number = if tail.is_empty() {
        match rest {
            // "11 A RUE ...": a lone letter between number and street.
            [letter, _, ..] if is_single_letter(letter) => {
                consumed = 1;
                format!("{digits}{letter}")
            }
            [suffix, ..] if is_number_suffix(suffix) => {
                consumed = 1;
                format!("{digits} {suffix}")
            }
            _ => digits.to_string(),
        }
    } else if is_single_letter(tail) || is_number_range(tail) {
        (*first).to_string()
    } else if is_number_suffix(tail) {
        format!("{digits} {tail}")
    } else if tail.chars().all(|c| c.is_alphabetic()) {
        // "11ARUE": the letters belong to the street.
        street_head = Some(tail);
        digits.to_string()
    } else {
        (*first).to_string()
    };

    let mut street: Vec<&str> = street_head.into_iter().collect();
    street.extend(&rest[consumed..]);
    parsed.street = street.join(" ");
    parsed.shape = AddressShape::NumberAndStreet;
    parsed
}

fn join_complements(outer: &str, inner: &str) -> String {
    match (outer.is_empty(), inner.is_empty()) {
        (_, true) => outer.to_string(),
        (true, false) => inner.to_string(),
        (false, false) => format!("{outer}, {inner}"),
    }
}

/// Removes the house number (bare or inside a range such as `199-201`) from
/// a complement. Returns `None` when nothing was removed.
pub fn prune_house_number(additional: &str, number: &str) -> Option<String> {
    if number.is_empty() {
        return None;
    }
    let mentions = |token: &str| {
        let token = token.trim_matches(',');
        token.eq_ignore_ascii_case(number)
            || (token.matches('-').count() == 1
                && token.split('-').any(|part| part.eq_ignore_ascii_case(number)))
    };
    let tokens: Vec<&str> = additional.split_whitespace().collect();
    let kept: Vec<&str> = tokens.iter().copied().filter(|t| !mentions(t)).collect();
    (kept.len() != tokens.len()).then(|| {
        kept.join(" ")
            .trim_matches(|c: char| c == ',' || c.is_whitespace())
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParsedAddress {
        let departments = DepartmentTable::embedded().unwrap();
        AddressParser::new(&departments).parse(input)
    }

    #[test]
    fn company_prefix_becomes_complement() {
        let parsed = parse("LOGISTICS OPERATIONS, 41 RUE MERCIER");
        assert_eq!(parsed.shape, AddressShape::CompanyPrefixed);
        assert_eq!(parsed.number, "41");
        assert_eq!(parsed.street, "RUE MERCIER");
        assert_eq!(parsed.additional, "LOGISTICS OPERATIONS");
    }

    #[test]
    fn spaced_postal_code_without_number() {
        let parsed = parse("RUE DE LA LEAVDE 38 170 SEYSSINET");
        assert_eq!(parsed.shape, AddressShape::WithPostalCode);
        assert_eq!(parsed.number, "");
        assert_eq!(parsed.street, "RUE DE LA LEAVDE");
        assert_eq!(parsed.postal_code, "38170");
        assert_eq!(parsed.city, "SEYSSINET");
    }

    #[test]
    fn full_line_with_comma() {
        let parsed = parse("87 RUE DE LA COMMANDERIE, 59500 DOUAI");
        assert_eq!(parsed.number, "87");
        assert_eq!(parsed.street, "RUE DE LA COMMANDERIE");
        assert_eq!(parsed.postal_code, "59500");
        assert_eq!(parsed.city, "DOUAI");
    }

    #[test]
    fn zone_without_numbered_street_stays_whole() {
        let parsed = parse("ZONE ARTISANALE 2 GUILLEME");
        assert_eq!(parsed.number, "");
        assert_eq!(parsed.street, "ZONE ARTISANALE 2 GUILLEME");
        assert!(parsed.additional.is_empty());
    }

    #[test]
    fn zone_prefix_with_numbered_street() {
        let parsed = parse("ZAC DU CHENE 12 RUE DES LILAS 33000 BORDEAUX");
        assert_eq!(parsed.shape, AddressShape::BusinessZone);
        assert_eq!(parsed.additional, "ZAC DU CHENE");
        assert_eq!(parsed.number, "12");
        assert_eq!(parsed.street, "RUE DES LILAS");
        assert_eq!(parsed.postal_code, "33000");
        assert_eq!(parsed.city, "BORDEAUX");
    }

    #[test]
    fn house_number_letters() {
        assert_eq!(parse("11A RUE DU PORT").number, "11A");
        let spaced = parse("11 A RUE DU PORT");
        assert_eq!(spaced.number, "11A");
        assert_eq!(spaced.street, "RUE DU PORT");
        let glued = parse("11 ARUE DU PORT");
        assert_eq!(glued.number, "11");
        assert_eq!(glued.street, "ARUE DU PORT");
        let bis = parse("11 BIS AVENUE FOCH");
        assert_eq!(bis.number, "11 BIS");
        assert_eq!(bis.street, "AVENUE FOCH");
        assert_eq!(parse("199-201 BOULEVARD VOLTAIRE").number, "199-201");
    }

    #[test]
    fn house_number_pair_before_keyword_is_not_a_postal_code() {
        let parsed = parse("12 150 RUE HAUTE");
        assert!(parsed.postal_code.is_empty());
    }

    #[test]
    fn leading_digit_pair_is_not_a_postal_code() {
        let parsed = parse("12 345 LIEU DIT LES PINS");
        assert!(parsed.postal_code.is_empty());
        assert!(parsed.city.is_empty());
        assert_eq!(parsed.number, "12");
        assert_eq!(parsed.street, "345 LIEU DIT LES PINS");

        let bare = parse("33000 BORDEAUX");
        assert_eq!(bare.postal_code, "33000");
        assert_eq!(bare.city, "BORDEAUX");
    }

    #[test]
    fn invalid_department_is_not_a_postal_code() {
        let parsed = parse("3 RUE HAUTE 99100 NOWHERE");
        assert!(parsed.postal_code.is_empty());
        assert_eq!(parsed.number, "3");
    }

    #[test]
    fn prune_removes_number_and_ranges() {
        assert_eq!(
            prune_house_number("199-201 BATIMENT A", "199").as_deref(),
            Some("BATIMENT A")
        );
        assert_eq!(prune_house_number("BATIMENT 41", "41").as_deref(), Some("BATIMENT"));
        assert_eq!(prune_house_number("BATIMENT A", "41"), None);
        assert_eq!(prune_house_number("41", ""), None);
    }
}
