//! Glue between command-line arguments, configuration and the library crates.

pub(crate) mod pipeline;
