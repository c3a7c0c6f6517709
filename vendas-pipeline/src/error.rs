//! Pipeline error types.
//!
//! Every failure mode has a named variant. Dirty cell values are not errors:
//! numeric coercion silently falls back to zero by design.

use thiserror::Error;

use crate::schema::Role;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required semantic role has no matching column. Fatal to the run;
    /// the presentation layer must surface it instead of a partial dashboard.
    #[error("no column matching role `{0}` in the header row")]
    MissingColumn(Role),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file extension `{0}` (expected .xlsx, .xls or .csv)")]
    UnsupportedFormat(String),
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
