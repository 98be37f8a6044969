use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the failure cases that can occur while the pipeline
/// ingests source rows, looks up the catalog, or persists orders.
///
/// Recoverable conditions are deliberately absent from this enum: a row
/// without a work-order number, an unparseable date, or a labor line with no
/// catalog match are handled in place (skipped, nulled, or alerted) and never
/// surface as a `SyncError`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the source workbook does not contain the expected sheet.
    #[error("missing sheet '{0}' in source workbook")]
    MissingSheet(String),

    /// Raised when the service catalog cannot be fetched at all. An empty
    /// catalog is not an error; an unreachable one aborts the run.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Raised by store implementations when a write is rejected.
    #[error("store error: {0}")]
    Store(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
