//! French department table used to validate postal-code prefixes.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::error::StandardsError;

const EMBEDDED_DEPARTMENTS: &str = include_str!("../data/departments.csv");

/// Overseas postal prefixes; only some of them name a collectivity.
const OVERSEAS_PREFIXES: RangeInclusive<u16> = 971..=989;

/// One row of `departments.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Department {
    /// Administrative code (`01`, `2A`, `974`).
    pub code: String,
    pub name: String,
    /// Leading postal-code digits (`20` for both Corsican departments).
    pub postal_prefix: String,
}

/// Departments indexed by postal prefix.
#[derive(Debug, Clone, Default)]
pub struct DepartmentTable {
    by_prefix: BTreeMap<String, Vec<Department>>,
}

impl DepartmentTable {
    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self, StandardsError> {
        Self::from_csv_str(EMBEDDED_DEPARTMENTS, "departments.csv")
    }

    pub fn from_csv_str(source: &str, origin: &str) -> Result<Self, StandardsError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source.as_bytes());
        let mut by_prefix: BTreeMap<String, Vec<Department>> = BTreeMap::new();
        for row in reader.deserialize::<Department>() {
            let department = row.map_err(|source| StandardsError::Csv {
                origin: origin.to_string(),
                source,
            })?;
            by_prefix
                .entry(department.postal_prefix.clone())
                .or_default()
                .push(department);
        }
        Ok(Self { by_prefix })
    }

    pub fn len(&self) -> usize {
        self.by_prefix.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }

    /// Postal prefix of a five-digit code: three digits overseas, two otherwise.
    pub fn prefix_of(postal_code: &str) -> Option<&str> {
        if postal_code.len() != 5 || !postal_code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if postal_code.starts_with("97") || postal_code.starts_with("98") {
            Some(&postal_code[..3])
        } else {
            Some(&postal_code[..2])
        }
    }

    /// Departments served by a five-digit postal code.
    pub fn lookup(&self, postal_code: &str) -> &[Department] {
        Self::prefix_of(postal_code)
            .and_then(|prefix| self.by_prefix.get(prefix))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when the code is five digits with a known department prefix or
    /// an overseas prefix between 971 and 989.
    pub fn is_valid_postal_code(&self, postal_code: &str) -> bool {
        match Self::prefix_of(postal_code) {
            Some(prefix) if prefix.len() == 3 => prefix
                .parse::<u16>()
                .is_ok_and(|prefix| OVERSEAS_PREFIXES.contains(&prefix)),
            Some(_) => !self.lookup(postal_code).is_empty(),
            None => false,
        }
    }
}
