//! Categorical filters applied to the fact table before aggregation.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MatrixError, Result};
use crate::schema::{FactSchema, require_column};

/// Categorical dimensions of the fact table that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Top-level business partition
    BusinessUnit,
    /// Originating branch
    Branch,
    /// Product group
    ProductGroup,
    /// Origination channel (physical, digital, ...)
    ChannelOrigin,
}

impl Dimension {
    /// All dimensions.
    pub const ALL: [Self; 4] = [
        Self::BusinessUnit,
        Self::Branch,
        Self::ProductGroup,
        Self::ChannelOrigin,
    ];

    /// Stable snake_case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessUnit => "business_unit",
            Self::Branch => "branch",
            Self::ProductGroup => "product_group",
            Self::ChannelOrigin => "channel_origin",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = MatrixError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "business_unit" | "unit" => Ok(Self::BusinessUnit),
            "branch" => Ok(Self::Branch),
            "product_group" | "product" => Ok(Self::ProductGroup),
            "channel_origin" | "channel" => Ok(Self::ChannelOrigin),
            other => Err(MatrixError::InvalidParameter(format!(
                "unknown dimension: {other}"
            ))),
        }
    }
}

/// Equality or membership predicate on one dimension.
///
/// A single value is an equality test; several values form a membership
/// test. An empty value list matches no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilter {
    /// Dimension to test
    pub dimension: Dimension,
    /// Accepted values
    pub values: Vec<String>,
}

impl GroupFilter {
    /// Keep rows whose dimension equals `value`.
    pub fn equals(dimension: Dimension, value: impl Into<String>) -> Self {
        Self {
            dimension,
            values: vec![value.into()],
        }
    }

    /// Keep rows whose dimension is one of `values`.
    pub fn one_of<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn to_expr(&self, column: &str) -> Option<Expr> {
        self.values
            .iter()
            .map(|value| col(column).cast(DataType::String).eq(lit(value.as_str())))
            .reduce(|acc, next| acc.or(next))
    }
}

/// Apply all `filters` (AND-combined) to `frame`.
///
/// Dimension columns are compared as strings, so numeric branch codes can be
/// filtered with their textual form.
pub fn apply_filters(
    frame: &DataFrame,
    schema: &FactSchema,
    filters: &[GroupFilter],
) -> Result<DataFrame> {
    if filters.is_empty() {
        return Ok(frame.clone());
    }

    let mut lazy = frame.clone().lazy();
    for filter in filters {
        let column = schema.dimension_column(filter.dimension);
        require_column(frame, column)?;
        match filter.to_expr(column) {
            Some(predicate) => lazy = lazy.filter(predicate),
            None => return Ok(frame.clear()),
        }
    }

    let filtered = lazy.collect()?;
    log::debug!(
        "filters kept {} of {} fact rows",
        filtered.height(),
        frame.height()
    );
    Ok(filtered)
}
