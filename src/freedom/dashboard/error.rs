use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Error type covering the failures that can occur while the dashboard loads,
/// normalizes, or exports its dataset.
///
/// Filtering and aggregation never fail on empty input; an empty selection is
/// an ordinary outcome and is not represented here.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the delimited text reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when the source dataset is reachable but cannot be turned into
    /// a raw table (missing sheet, no header row, no rows).
    #[error("failed to load dataset from {origin}: {reason}")]
    Load { origin: String, reason: String },

    /// Raised when normalization cannot locate a required column.
    #[error("required field '{field}' not found; looked for {candidates:?}")]
    Schema {
        field: &'static str,
        candidates: Vec<String>,
    },

    /// Raised when a filter criterion is malformed.
    #[error("invalid filter criteria: {0}")]
    InvalidCriteria(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the source file extension is not one the loader knows.
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl DashboardError {
    /// Returns `true` when the error stems from acquiring the source dataset.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Io(_)
                | DashboardError::ExcelRead(_)
                | DashboardError::Csv(_)
                | DashboardError::Load { .. }
                | DashboardError::MissingInput(_)
                | DashboardError::UnsupportedFormat(_)
        )
    }

    /// Returns `true` when normalization rejected the table's schema.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, DashboardError::Schema { .. })
    }
}
