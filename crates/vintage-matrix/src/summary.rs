//! Trailing `mean` / `max` / `min` rows.

use serde::{Deserialize, Serialize};

use crate::matrix::{MatrixRow, RowKey};

/// Kind of summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    /// Arithmetic mean of the non-null cells
    Mean,
    /// Largest non-null cell
    Max,
    /// Smallest non-null cell
    Min,
}

impl SummaryKind {
    /// Summary rows in display order.
    pub const ALL: [Self; 3] = [Self::Mean, Self::Max, Self::Min];

    /// Row label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// Aggregate the non-null values; `None` when there are none.
    pub fn apply(&self, values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
        let present: Vec<f64> = values.into_iter().flatten().collect();
        if present.is_empty() {
            return None;
        }
        match self {
            Self::Mean => Some(present.iter().sum::<f64>() / present.len() as f64),
            Self::Max => present.into_iter().reduce(f64::max),
            Self::Min => present.into_iter().reduce(f64::min),
        }
    }
}

/// Compute summary rows over the cohort rows of `rows`.
///
/// Rows that are already summaries are ignored, so summaries never feed into
/// each other. `initial_volume` is summarised only when `summarize_volume`
/// is set; otherwise it is null in every summary row.
pub(crate) fn summarize(rows: &[MatrixRow], width: usize, summarize_volume: bool) -> Vec<MatrixRow> {
    let cohorts: Vec<&MatrixRow> = rows.iter().filter(|r| !r.key.is_summary()).collect();

    SummaryKind::ALL
        .iter()
        .map(|kind| {
            let cells = (0..width)
                .map(|index| {
                    kind.apply(
                        cohorts
                            .iter()
                            .map(|r| r.cells.get(index).copied().flatten()),
                    )
                })
                .collect();
            let initial_volume = if summarize_volume {
                kind.apply(cohorts.iter().map(|r| r.initial_volume))
            } else {
                None
            };
            MatrixRow {
                key: RowKey::Summary(*kind),
                cells,
                initial_volume,
            }
        })
        .collect()
}
