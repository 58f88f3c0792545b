//! Exposure breakdown by cohort and categorical dimension.
//!
//! Feeds the stacked "balance by origination channel" chart: one total per
//! (origination month, category) pair.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::filter::{Dimension, GroupFilter, apply_filters};
use crate::month::CohortMonth;
use crate::schema::{FactSchema, read_categories, read_measure, read_periods};

/// Label used for rows with a null category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Total of a value column for one cohort and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureBar {
    /// Origination month
    pub cohort: CohortMonth,
    /// Dimension value
    pub category: String,
    /// Sum of the value column
    pub total: f64,
}

/// Sum `value_column` per (origination month, `dimension` value) after filtering.
///
/// Null amounts count as zero, null categories are reported as
/// [`UNKNOWN_CATEGORY`] and rows with no origination period are skipped. The
/// result is sorted by cohort, then category; an empty vector means no rows
/// matched.
pub fn exposure_by_dimension(
    facts: &DataFrame,
    schema: &FactSchema,
    dimension: Dimension,
    value_column: &str,
    filters: &[GroupFilter],
) -> Result<Vec<ExposureBar>> {
    schema.validate(facts)?;
    let filtered = apply_filters(facts, schema, filters)?;

    let periods = read_periods(&filtered, &schema.origination_column)?;
    let categories = read_categories(&filtered, schema.dimension_column(dimension))?;
    let values = read_measure(&filtered, value_column)?;

    let mut groups: BTreeMap<(CohortMonth, String), Vec<f64>> = BTreeMap::new();
    for ((period, category), value) in periods.into_iter().zip(categories).zip(values) {
        let Some(cohort) = period else {
            continue;
        };
        let category = category.unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
        groups.entry((cohort, category)).or_default().extend(value);
    }

    let bars: Vec<ExposureBar> = groups
        .into_iter()
        .map(|((cohort, category), mut amounts)| {
            amounts.sort_by(f64::total_cmp);
            ExposureBar {
                cohort,
                category,
                total: amounts.into_iter().sum(),
            }
        })
        .collect();

    log::debug!(
        "exposure by {dimension}: {} bars from {} rows",
        bars.len(),
        filtered.height()
    );
    Ok(bars)
}
