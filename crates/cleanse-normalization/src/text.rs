//! Text normalizers.
//!
//! Three passes, applied in order to every free-text field:
//!
//! 1. [`normalize_whitespace`]: trim, collapse runs of whitespace, apply case.
//! 2. [`normalize_special_characters`]: ASCII quotes and dashes, drop
//!    zero-width code points, transliterate diacritics via canonical
//!    decomposition.
//! 3. [`clean_punctuation`]: remove stray punctuation, keeping protected
//!    abbreviations such as `S.A.R.L.` intact.
//!
//! Each pass is idempotent and so is their composition, [`normalize_text`].

use cleanse_standards::keywords::{ADDRESS_PUNCTUATION_EXCEPTIONS, NAME_PUNCTUATION_EXCEPTIONS};
use cleanse_standards::{PunctuationRule, TextCase};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Collapses every whitespace run to one space and trims both ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn apply_case(value: String, case: TextCase) -> String {
    match case {
        TextCase::Upper => value.to_uppercase(),
        TextCase::Lower => value.to_lowercase(),
        TextCase::Preserve => value,
    }
}

/// Trims, collapses whitespace and applies the field's case rule.
pub fn normalize_whitespace(value: &str, case: TextCase) -> String {
    apply_case(collapse_whitespace(value), case)
}

fn substitute(c: char) -> Option<&'static str> {
    let replacement = match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{02BC}' | '`'
        | '\u{00B4}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
        | '\u{00BB}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' => "-",
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}' => "",
        '\u{00A0}' | '\u{202F}' | '\u{2007}' | '\u{2009}' => " ",
        '\u{00D7}' => "X",
        '\u{00F7}' => "/",
        '\u{2026}' => "...",
        '\u{0152}' => "OE",
        '\u{0153}' => "oe",
        '\u{00C6}' => "AE",
        '\u{00E6}' => "ae",
        _ => return None,
    };
    Some(replacement)
}

/// Replaces typographic characters with ASCII and strips diacritics.
pub fn normalize_special_characters(value: &str) -> String {
    let mut substituted = String::with_capacity(value.len());
    for c in value.chars() {
        match substitute(c) {
            Some(replacement) => substituted.push_str(replacement),
            None => substituted.push(c),
        }
    }
    let stripped: String = substituted
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    collapse_whitespace(&stripped)
}

/// Characters removed by a punctuation rule. Hyphens and apostrophes are
/// never part of a removal set.
pub fn removal_set(rule: PunctuationRule) -> &'static [char] {
    match rule {
        PunctuationRule::Name => &['.', ',', ';', ':', '!', '?', '"', '(', ')'],
        PunctuationRule::Address => &['.', ';', ':', '!', '?', '"', '(', ')'],
        PunctuationRule::FreeText => &['"', '[', ']', '{', '}'],
        PunctuationRule::None => &[],
    }
}

/// Abbreviations protected from point removal under a rule.
pub fn exceptions(rule: PunctuationRule) -> &'static [&'static str] {
    match rule {
        PunctuationRule::Name => NAME_PUNCTUATION_EXCEPTIONS,
        PunctuationRule::Address => ADDRESS_PUNCTUATION_EXCEPTIONS,
        PunctuationRule::FreeText | PunctuationRule::None => &[],
    }
}

/// Length of the protected abbreviation opening `token`, if the rest of the
/// token is punctuation only.
fn protected_prefix(token: &str, exceptions: &[&str]) -> Option<usize> {
    exceptions.iter().find_map(|exception| {
        let head = token.get(..exception.len())?;
        let tail = &token[exception.len()..];
        (head.eq_ignore_ascii_case(exception) && !tail.chars().any(char::is_alphanumeric))
            .then_some(exception.len())
    })
}

fn clean_token(token: &str, removable: &[char], exceptions: &[&str]) -> String {
    let core_start = token
        .char_indices()
        .find(|(_, c)| *c == '.' || !removable.contains(c))
        .map_or(token.len(), |(idx, _)| idx);
    let core = &token[core_start..];
    if let Some(len) = protected_prefix(core, exceptions) {
        let (abbreviation, tail) = core.split_at(len);
        let tail: String = tail.chars().filter(|c| !removable.contains(c)).collect();
        return format!("{abbreviation}{tail}");
    }
    token.chars().filter(|c| !removable.contains(c)).collect()
}

/// Removes the rule's punctuation outside protected abbreviations, then
/// collapses whitespace.
pub fn clean_punctuation(value: &str, rule: PunctuationRule) -> String {
    let removable = removal_set(rule);
    if removable.is_empty() {
        return value.to_string();
    }
    let exceptions = exceptions(rule);
    let cleaned: Vec<String> = value
        .split_whitespace()
        .map(|token| clean_token(token, removable, exceptions))
        .filter(|token| !token.is_empty())
        .collect();
    cleaned.join(" ")
}

/// Which pass changed a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPass {
    Whitespace,
    SpecialCharacters,
    Punctuation,
}

impl TextPass {
    /// Observation type emitted when the pass modifies a value.
    pub fn observation_type(&self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace_normalized",
            Self::SpecialCharacters => "special_characters_normalized",
            Self::Punctuation => "punctuation_cleaned",
        }
    }
}

/// One modification made by a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub pass: TextPass,
    pub before: String,
    pub after: String,
}

/// Output of [`normalize_text`]: the final value and every intermediate change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub value: String,
    pub changes: Vec<TextChange>,
}

/// Runs the three passes in order, recording each effective change.
pub fn normalize_text(value: &str, case: TextCase, rule: PunctuationRule) -> NormalizedText {
    let mut changes = Vec::new();
    let mut current = value.to_string();
    let passes: [(TextPass, &dyn Fn(&str) -> String); 3] = [
        (TextPass::Whitespace, &|v| normalize_whitespace(v, case)),
        // Transliteration can introduce letters (`×` -> `X`), so case is reapplied.
        (TextPass::SpecialCharacters, &|v| {
            apply_case(normalize_special_characters(v), case)
        }),
        (TextPass::Punctuation, &|v| clean_punctuation(v, rule)),
    ];
    for (pass, apply) in passes {
        let next = apply(&current);
        if next != current {
            changes.push(TextChange {
                pass,
                before: current.clone(),
                after: next.clone(),
            });
            current = next;
        }
    }
    NormalizedText {
        value: current,
        changes,
    }
}
