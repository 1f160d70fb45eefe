//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use cleanse_model::EntityType;
use cleanse_report::ReportFormat;
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cleanse",
    version,
    about = "Clean and validate business-entity extracts",
    long_about = "Clean and validate business-entity extracts (companies, organizations,\n\
                  logistic addresses, stock imports, stocks, transports).\n\n\
                  Writes a cleaned JSON file per entity and an error workbook\n\
                  listing every correction and remaining defect."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow row-level values (names, identifiers) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean one entity file.
    Clean(CleanArgs),

    /// Clean every entity whose input file exists in a directory.
    Batch(BatchArgs),

    /// List the entity schemas.
    Entities,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Entity type (companies, organizations, logistic_addresses,
    /// stock_imports, stocks, transports).
    #[arg(value_name = "ENTITY", value_parser = parse_entity)]
    pub entity: EntityType,

    /// Raw input file (default: ./<ENTITY>.json).
    #[arg(long = "input", short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Cleaned output file (default: <INPUT_DIR>/cleaned/<ENTITY>_cleaned.json).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Directory holding `<entity>.json` input files.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory for cleaned files (default: <INPUT_DIR>/cleaned).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options shared by `clean` and `batch`.
#[derive(Args)]
pub struct RunArgs {
    /// Directory holding patch files (default: <INPUT_DIR>/patches when present).
    #[arg(long = "patches-dir", value_name = "DIR")]
    pub patches_dir: Option<PathBuf>,

    /// Directory for error reports (default: the output directory).
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Directory for run manifests (default: <OUTPUT_DIR>/logs).
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Error report formats.
    #[arg(
        long = "report-format",
        value_enum,
        value_delimiter = ',',
        default_value = "xlsx"
    )]
    pub report_formats: Vec<ReportFormatArg>,

    /// Keep the original letter case of text fields.
    #[arg(long = "no-uppercase")]
    pub no_uppercase: bool,

    /// Skip patch files.
    #[arg(long = "no-patches")]
    pub no_patches: bool,

    /// Do not write error reports.
    #[arg(long = "no-error-report")]
    pub no_error_report: bool,

    /// Exit with status 1 when any error observation was recorded.
    #[arg(long = "fail-on-errors")]
    pub fail_on_errors: bool,
}

fn parse_entity(value: &str) -> Result<EntityType, String> {
    value.parse::<EntityType>().map_err(|err| err.to_string())
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Xlsx,
    Json,
    Csv,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(value: ReportFormatArg) -> Self {
        match value {
            ReportFormatArg::Xlsx => Self::Xlsx,
            ReportFormatArg::Json => Self::Json,
            ReportFormatArg::Csv => Self::Csv,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
