//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading the fact table.
#[derive(Debug, Error)]
pub enum DataError {
    /// Dataset file does not exist
    #[error("Dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File extension is not a supported tabular format
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
