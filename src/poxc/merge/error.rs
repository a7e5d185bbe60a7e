use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Error type covering the different failure cases that can occur while the
/// tool loads, joins, or writes the sample data.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the configuration file or run summary cannot be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the delimited-text reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a workbook does not contain the requested tab.
    #[error("missing sheet '{sheet}' in {}", file.display())]
    MissingSheet { file: PathBuf, sheet: String },

    /// Raised when a join column cannot be located in a sheet header.
    #[error("missing column '{column}' in {}", file.display())]
    MissingColumn { file: PathBuf, column: String },

    /// Raised when the key workbook does not exist.
    #[error("key table not found: {0}")]
    MissingKeyTable(PathBuf),

    /// Raised when the key table repeats a (plot, depth) pair and the strict
    /// key policy is active.
    #[error("key table contains duplicated keys: {0}")]
    DuplicateKeyTableEntries(String),

    /// Raised when no source file could be merged.
    #[error("no source files were merged from {0}")]
    NoSourcesMerged(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
