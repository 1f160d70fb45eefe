use cleanse_normalization::{
    DateOutcome, clean_punctuation, normalize_date, normalize_special_characters, normalize_text,
};
use cleanse_standards::{PunctuationRule, TextCase};
use proptest::prelude::*;
use serde_json::json;

fn cases() -> impl Strategy<Value = TextCase> {
    prop_oneof![
        Just(TextCase::Upper),
        Just(TextCase::Lower),
        Just(TextCase::Preserve)
    ]
}

fn rules() -> impl Strategy<Value = PunctuationRule> {
    prop_oneof![
        Just(PunctuationRule::Name),
        Just(PunctuationRule::Address),
        Just(PunctuationRule::FreeText),
        Just(PunctuationRule::None)
    ]
}

const BUSINESS_TEXT: &str = "[a-zA-Z0-9éèêàçôÉÈÇŒœ’“”–—×\u{00A0}\u{200B} .,;:!?\"()'\\-]{0,48}";

proptest! {
    #[test]
    fn normalize_text_is_idempotent(input in BUSINESS_TEXT, case in cases(), rule in rules()) {
        let once = normalize_text(&input, case, rule);
        let twice = normalize_text(&once.value, case, rule);
        prop_assert_eq!(&twice.value, &once.value);
        prop_assert!(twice.changes.is_empty());
    }

    #[test]
    fn output_is_trimmed_and_collapsed(input in BUSINESS_TEXT, rule in rules()) {
        let value = normalize_text(&input, TextCase::Upper, rule).value;
        prop_assert_eq!(value.trim(), value.as_str());
        prop_assert!(!value.contains("  "));
    }

    #[test]
    fn special_characters_yield_ascii_for_french_text(input in "[a-zA-ZéèêëàâîïôûùüçÉÈÊÀÂÎÔÛÇ ]{0,32}") {
        prop_assert!(normalize_special_characters(&input).is_ascii());
    }

    #[test]
    fn hyphens_and_apostrophes_survive(word in "[A-Z]{1,8}", rule in rules()) {
        let input = format!("{word}-D'{word}");
        prop_assert_eq!(clean_punctuation(&input, rule), input);
    }

    #[test]
    fn normalized_dates_are_stable(year in 1950i32..2050, month in 1u32..=12, day in 1u32..=28) {
        let slash = format!("{day:02}/{month:02}/{year}");
        let DateOutcome::Normalized(iso) = normalize_date(&json!(slash)) else {
            panic!("slash date should normalize");
        };
        prop_assert_eq!(normalize_date(&json!(iso.clone())), DateOutcome::Unchanged(iso));
    }
}
