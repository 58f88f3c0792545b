//! Error types shared across the workspace.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`crate::VintageConfig`]
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config values are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),

    /// No business-unit profile with this name
    #[error("unknown business unit profile: {0}")]
    UnknownProfile(String),
}

/// Any error raised by the vintage crates.
#[derive(Debug, Error)]
pub enum VintageError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Dataset loading error
    #[error(transparent)]
    Data(#[from] vintage_data::DataError),

    /// Matrix construction error
    #[error(transparent)]
    Matrix(#[from] vintage_matrix::MatrixError),

    /// Export error
    #[error(transparent)]
    Export(#[from] vintage_output::ExportError),

    /// Report error
    #[error(transparent)]
    Report(#[from] vintage_output::ReportError),
}

/// Result type alias for vintage operations.
pub type Result<T> = std::result::Result<T, VintageError>;
