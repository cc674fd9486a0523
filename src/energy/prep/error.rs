use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Error type covering the different failure cases that can occur when a
/// source is read, normalized, or written out.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the CSV reader.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a sheet does not follow the expected layout.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a closed vocabulary meets a label it has no bucket for.
    #[error("unmapped {vocabulary} label '{label}'")]
    UnmappedLabel { vocabulary: String, label: String },

    /// Raised when a production label is neither kept nor dropped.
    #[error("production label '{0}' is not classified as kept or dropped")]
    UnclassifiedProductionLabel(String),

    /// Raised when a source lacks columns the extractor depends on.
    #[error("{source_name} is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    /// Raised when no year could be selected from a source.
    #[error("no year columns found to process in {source_name}")]
    NoYears { source_name: String },

    /// Raised when a source produced zero profiles across all years.
    #[error("{source_name} produced no profiles")]
    EmptyDataset { source_name: String },

    /// Raised when every configured source failed.
    #[error("no dataset could be produced: {}", .0.join("; "))]
    NoDatasetProduced(Vec<String>),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a taxonomy override file is structurally valid JSON but
    /// unusable.
    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
