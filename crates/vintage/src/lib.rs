#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vintage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;

// Re-export main types from sub-crates
pub use vintage_data as data;
pub use vintage_matrix as matrix;
pub use vintage_output as output;

pub use config::{BusinessUnitProfile, VintageConfig};
pub use error::{ConfigError, Result, VintageError};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
