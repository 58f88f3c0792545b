//! Caching layer for the fact table.

pub mod dataset;

pub use dataset::{CacheStats, DatasetCache};
