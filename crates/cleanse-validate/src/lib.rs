//! Identifier validation and cross-field checks.

pub mod arrays;
pub mod consistency;
pub mod identifiers;
pub mod uniqueness;

pub use arrays::{ArrayDedup, dedup_integer_array, dedup_text_array};
pub use consistency::{check_siret_siren, check_vat_siren, siren_from_siret};
pub use identifiers::{Finding, Validated, luhn_valid, validate_identifier};
pub use uniqueness::{Duplicate, find_duplicates, uniqueness_key};
