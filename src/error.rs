use std::path::PathBuf;
use thiserror::Error;

/// Failures of the data boundary. The computations themselves never fail.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("File not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported data file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("No valid food records loaded from {}", .0.display())]
    Empty(PathBuf),

    #[error("No restriction profile for user '{0}'")]
    UnknownUser(String),
}
