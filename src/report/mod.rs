//! Report generation
//!
//! This module handles:
//! - Building a [`Report`] from the rows returned by an upsert
//! - The read-only tabular view handed to renderers
//! - Writing the combined markdown report for a run

mod builder;
mod format;
mod markdown;

pub use builder::{Report, ReportBuilder, ReportLine};
pub use format::{format_currency, format_duration, format_signed, format_signed_pct, format_thousands};
pub use markdown::{format_markdown_report, generate_markdown_report, report_subject};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
