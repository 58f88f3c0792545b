//! Error types for matrix construction.

use thiserror::Error;

/// Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;

/// Failures that prevent a matrix from being built at all.
///
/// "No usable measure columns" and "no cohorts left after filtering" are not
/// errors; they are reported through [`crate::MatrixOutcome`].
#[derive(Debug, Error)]
pub enum MatrixError {
    /// A required column is not present in the fact table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// An origination period could not be interpreted as a month
    #[error("Invalid origination period: {0:?}")]
    InvalidPeriod(String),

    /// A column has a type that cannot be used for the requested role
    #[error("Column {column} has unsupported type {dtype}")]
    UnsupportedType {
        /// Column name
        column: String,
        /// Polars dtype, rendered as text
        dtype: String,
    },

    /// Invalid builder parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
