//! Field-level normalization: text cleaning, type coercion and dates.

pub mod coerce;
pub mod dates;
pub mod text;

pub use coerce::{
    ArrayShape, Coercion, coerce_array, coerce_boolean, coerce_float, coerce_integer,
    float_value, parse_decimal, percent_to_ratio,
};
pub use dates::{DateOutcome, format_iso, normalize_date, parse_date};
pub use text::{
    NormalizedText, TextChange, TextPass, clean_punctuation, collapse_whitespace,
    normalize_special_characters, normalize_text, normalize_whitespace,
};
