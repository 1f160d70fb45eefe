//! Invocation parameters.

use std::path::{Path, PathBuf};

use cleanse_core::CleaningOptions;
use cleanse_model::EntityType;
use cleanse_report::ReportFormat;

/// Behaviour switches for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Uppercase text fields whose schema asks for it.
    pub uppercase_text: bool,
    pub apply_patches: bool,
    pub write_error_report: bool,
    pub report_formats: Vec<ReportFormat>,
    /// Host exit policy: treat any error observation as a failed run.
    pub fail_on_errors: bool,
    /// Allow row-level values in trace logs.
    pub log_data: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            uppercase_text: true,
            apply_patches: true,
            write_error_report: true,
            report_formats: vec![ReportFormat::Xlsx],
            fail_on_errors: false,
            log_data: false,
        }
    }
}

impl CleanOptions {
    #[must_use]
    pub fn with_uppercase_text(mut self, enable: bool) -> Self {
        self.uppercase_text = enable;
        self
    }

    #[must_use]
    pub fn with_apply_patches(mut self, enable: bool) -> Self {
        self.apply_patches = enable;
        self
    }

    #[must_use]
    pub fn with_write_error_report(mut self, enable: bool) -> Self {
        self.write_error_report = enable;
        self
    }

    #[must_use]
    pub fn with_report_formats(mut self, formats: Vec<ReportFormat>) -> Self {
        self.report_formats = formats;
        self
    }

    #[must_use]
    pub fn with_fail_on_errors(mut self, enable: bool) -> Self {
        self.fail_on_errors = enable;
        self
    }

    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }

    pub(crate) fn cleaning_options(&self) -> CleaningOptions {
        CleaningOptions {
            uppercase_text: self.uppercase_text,
            apply_patches: self.apply_patches,
        }
    }
}

/// Everything one `clean` call needs.
#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub entity: EntityType,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub patches_dir: Option<PathBuf>,
    pub error_report_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub options: CleanOptions,
}

impl CleanRequest {
    /// Request with reports written next to the output file.
    pub fn new(entity: EntityType, input_path: &Path, output_path: &Path) -> Self {
        let error_report_dir = output_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            entity,
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            patches_dir: None,
            error_report_dir,
            log_dir: None,
            options: CleanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_patches_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.patches_dir = dir;
        self
    }

    #[must_use]
    pub fn with_error_report_dir(mut self, dir: PathBuf) -> Self {
        self.error_report_dir = dir;
        self
    }

    #[must_use]
    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }
}
