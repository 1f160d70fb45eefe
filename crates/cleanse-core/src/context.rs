use std::path::Path;

use cleanse_model::{Record, RecordExt};
use cleanse_standards::{DepartmentTable, EntitySchema, TextCase};

#[derive(Debug, Clone, Copy)]
pub struct CleaningOptions {
    /// Uppercase fields declared `upper`; when false they keep their case.
    pub uppercase_text: bool,
    pub apply_patches: bool,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            uppercase_text: true,
            apply_patches: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CleaningContext<'a> {
    pub schema: &'a EntitySchema,
    pub departments: &'a DepartmentTable,
    pub patches_dir: Option<&'a Path>,
    /// Key of the object that wrapped the input array, if any.
    pub input_wrapper: Option<&'a str>,
    pub options: CleaningOptions,
}

impl<'a> CleaningContext<'a> {
    pub fn new(schema: &'a EntitySchema, departments: &'a DepartmentTable) -> Self {
        Self {
            schema,
            departments,
            patches_dir: None,
            input_wrapper: None,
            options: CleaningOptions::default(),
        }
    }

    pub fn with_patches_dir(mut self, patches_dir: &'a Path) -> Self {
        self.patches_dir = Some(patches_dir);
        self
    }

    pub fn with_input_wrapper(mut self, key: &'a str) -> Self {
        self.input_wrapper = Some(key);
        self
    }

    pub fn with_options(mut self, options: CleaningOptions) -> Self {
        self.options = options;
        self
    }

    /// Primary-key value of a record, when it is an integer.
    pub fn entity_id(&self, record: &Record) -> Option<i64> {
        record.integer(&self.schema.primary_key)
    }

    /// Case rule actually applied to a field.
    pub fn effective_case(&self, case: TextCase) -> TextCase {
        match case {
            TextCase::Upper if !self.options.uppercase_text => TextCase::Preserve,
            other => other,
        }
    }
}
