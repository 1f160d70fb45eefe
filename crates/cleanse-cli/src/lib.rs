//! Host-side API for the cleansing pipeline.
//!
//! [`clean`] is the invocation contract: one entity file in, one cleaned
//! file and optional error reports out.

pub mod clean;
pub mod logging;
pub mod options;

pub use clean::{CleanResult, clean, clean_with_standards};
pub use options::{CleanOptions, CleanRequest};
