#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vintage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod error;
pub mod exposure;
pub mod filter;
pub mod matrix;
pub mod month;
pub mod ratio;
pub mod schema;
pub mod summary;

// Re-export main types
pub use builder::{CohortRatioMatrixBuilder, DEFAULT_MAX_OFFSET, MatrixOutcome};
pub use error::{MatrixError, Result};
pub use exposure::{ExposureBar, UNKNOWN_CATEGORY, exposure_by_dimension};
pub use filter::{Dimension, GroupFilter, apply_filters};
pub use matrix::{
    Alignment, COHORT_COLUMN, INITIAL_VOLUME, MatrixColumn, MatrixRow, RowKey, VintageMatrix,
};
pub use month::CohortMonth;
pub use ratio::safe_ratio;
pub use schema::{FactSchema, MeasureSchema, OffsetColumns};
pub use summary::SummaryKind;
