//! Cohort ratio matrix construction.
//!
//! The build runs in one pass over the filtered fact table:
//!
//! 1. resolve the [`MeasureSchema`] (offset -> numerator/denominator columns);
//! 2. apply group filters and the look-back window;
//! 3. reshape the wide measure columns into long-form
//!    `(cohort, offset, numerator, denominator)` observations;
//! 4. aggregate per `(cohort, offset)` and divide with [`safe_ratio`];
//! 5. lay out the columns for the requested [`Alignment`];
//! 6. optionally append summary rows.
//!
//! Sums are taken over sorted values, so the result is bit-identical for
//! any ordering of the input rows.

use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::filter::{GroupFilter, apply_filters};
use crate::matrix::{Alignment, MatrixColumn, MatrixRow, RowKey, VintageMatrix};
use crate::month::CohortMonth;
use crate::ratio::safe_ratio;
use crate::schema::{FactSchema, MeasureSchema, read_measure, read_periods};

/// Default number of maturity offsets searched.
pub const DEFAULT_MAX_OFFSET: u32 = 24;

/// Result of a matrix build.
///
/// The two sentinel variants are expected outcomes rather than errors, and
/// callers are meant to branch on them to show a "no data" message.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixOutcome {
    /// A matrix with at least one cohort row
    Ready(VintageMatrix),
    /// Measure columns exist but the filters left no cohorts
    EmptyCohortSet {
        /// Columns the matrix would have had; empty for calendar alignments
        /// when the table has no origination month at all
        columns: Vec<MatrixColumn>,
    },
    /// No offset has both a numerator and a denominator column
    NoMatchingColumns {
        /// Numerator prefix that was searched
        numerator_prefix: String,
        /// Denominator prefix that was searched
        denominator_prefix: String,
    },
}

impl MatrixOutcome {
    /// True for [`MatrixOutcome::Ready`].
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Borrow the matrix, if one was built.
    pub const fn matrix(&self) -> Option<&VintageMatrix> {
        match self {
            Self::Ready(matrix) => Some(matrix),
            _ => None,
        }
    }

    /// Take the matrix, if one was built.
    pub fn into_matrix(self) -> Option<VintageMatrix> {
        match self {
            Self::Ready(matrix) => Some(matrix),
            _ => None,
        }
    }
}

/// Builds a [`VintageMatrix`] from a loan fact table.
///
/// # Examples
///
/// ```
/// use polars::prelude::*;
/// use vintage_matrix::{Alignment, CohortRatioMatrixBuilder};
///
/// let facts = DataFrame::new(vec![
///     Series::new("origination_period".into(), &["2024-01", "2024-02"]).into(),
///     Series::new("npl_1".into(), &[50.0, 0.0]).into(),
///     Series::new("cap_1".into(), &[100.0, 0.0]).into(),
/// ])
/// .unwrap();
///
/// let matrix = CohortRatioMatrixBuilder::new("npl_", "cap_")
///     .alignment(Alignment::Relative)
///     .build(&facts)
///     .unwrap()
///     .into_matrix()
///     .unwrap();
///
/// assert_eq!(matrix.value("2024-01", "Month 1"), Some(0.5));
/// assert_eq!(matrix.value("2024-02", "Month 1"), None);
/// ```
#[derive(Debug, Clone)]
pub struct CohortRatioMatrixBuilder {
    numerator_prefix: String,
    denominator_prefix: String,
    max_offset: u32,
    alignment: Alignment,
    window_months: Option<u32>,
    filters: Vec<GroupFilter>,
    include_summary: bool,
    summarize_volume: bool,
    volume_column: Option<String>,
    close_months: Option<Vec<CohortMonth>>,
    schema: FactSchema,
}

impl CohortRatioMatrixBuilder {
    /// New builder for the `{numerator_prefix}{m}` / `{denominator_prefix}{m}` column families.
    pub fn new(numerator_prefix: impl Into<String>, denominator_prefix: impl Into<String>) -> Self {
        Self {
            numerator_prefix: numerator_prefix.into(),
            denominator_prefix: denominator_prefix.into(),
            max_offset: DEFAULT_MAX_OFFSET,
            alignment: Alignment::default(),
            window_months: None,
            filters: Vec::new(),
            include_summary: false,
            summarize_volume: false,
            volume_column: None,
            close_months: None,
            schema: FactSchema::default(),
        }
    }

    /// Highest offset to look for.
    pub fn max_offset(mut self, max_offset: u32) -> Self {
        self.max_offset = max_offset;
        self
    }

    /// Column alignment.
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Keep cohorts originated within `months` of the latest origination month.
    pub fn window_months(mut self, months: u32) -> Self {
        self.window_months = Some(months);
        self
    }

    /// Add a group filter.
    pub fn filter(mut self, filter: GroupFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add several group filters.
    pub fn filters(mut self, filters: impl IntoIterator<Item = GroupFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Append `mean`, `max` and `min` rows.
    pub fn include_summary(mut self, include: bool) -> Self {
        self.include_summary = include;
        self
    }

    /// Also summarise `initial_volume` in the summary rows.
    pub fn summarize_volume(mut self, summarize: bool) -> Self {
        self.summarize_volume = summarize;
        self
    }

    /// Column used for `initial_volume` when the offset-1 denominator is absent.
    pub fn volume_column(mut self, column: impl Into<String>) -> Self {
        self.volume_column = Some(column.into());
        self
    }

    /// Explicit close months for [`Alignment::TriangularCalendar`].
    pub fn close_months(mut self, months: impl IntoIterator<Item = CohortMonth>) -> Self {
        self.close_months = Some(months.into_iter().collect());
        self
    }

    /// Fixed column names of the fact table.
    pub fn schema(mut self, schema: FactSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Build the matrix from `facts`.
    pub fn build(&self, facts: &DataFrame) -> Result<MatrixOutcome> {
        self.schema.validate(facts)?;

        let measures = MeasureSchema::resolve(
            facts,
            &self.numerator_prefix,
            &self.denominator_prefix,
            self.max_offset,
        );
        if measures.is_empty() {
            return Ok(MatrixOutcome::NoMatchingColumns {
                numerator_prefix: self.numerator_prefix.clone(),
                denominator_prefix: self.denominator_prefix.clone(),
            });
        }

        // Calendar labels are anchored on the unfiltered table
        let reference = read_periods(facts, &self.schema.origination_column)?
            .into_iter()
            .flatten()
            .max();

        let filtered = apply_filters(facts, &self.schema, &self.filters)?;
        let cutoff = match (self.window_months, reference) {
            (Some(months), Some(reference)) => Some(reference.minus_months(months)),
            _ => None,
        };

        let aggregates = self.aggregate(&filtered, &measures, cutoff)?;
        if aggregates.cohorts.is_empty() {
            log::debug!("no cohorts left after filtering");
            return Ok(MatrixOutcome::EmptyCohortSet {
                columns: self.layout(&measures, reference),
            });
        }

        let columns = self.layout(&measures, reference);
        let rows = aggregates
            .cohorts
            .iter()
            .map(|&cohort| MatrixRow {
                key: RowKey::Cohort(cohort),
                cells: columns
                    .iter()
                    .map(|column| aggregates.cell(cohort, column))
                    .collect(),
                initial_volume: aggregates.volume.get(&cohort).copied().flatten(),
            })
            .collect();

        let matrix = VintageMatrix::new(self.alignment, reference, columns, rows)?;
        log::debug!(
            "built {} matrix: {} cohorts x {} columns",
            self.alignment,
            matrix.cohort_count(),
            matrix.columns().len()
        );

        Ok(MatrixOutcome::Ready(if self.include_summary {
            matrix.with_summary(self.summarize_volume)
        } else {
            matrix
        }))
    }

    /// Reshape the filtered table into long form and aggregate per cohort and offset.
    fn aggregate(
        &self,
        facts: &DataFrame,
        measures: &MeasureSchema,
        cutoff: Option<CohortMonth>,
    ) -> Result<Aggregates> {
        let periods = read_periods(facts, &self.schema.origination_column)?;

        let mut columns = Vec::with_capacity(measures.len());
        for pair in measures.offsets() {
            columns.push((
                pair.offset,
                read_measure(facts, &pair.numerator)?,
                read_measure(facts, &pair.denominator)?,
            ));
        }

        // Volume is the offset-1 denominator even when its numerator is missing
        let first_denominator = format!("{}1", self.denominator_prefix);
        let volume_source = if facts.column(&first_denominator).is_ok() {
            Some(read_measure(facts, &first_denominator)?)
        } else if let Some(column) = &self.volume_column {
            Some(read_measure(facts, column)?)
        } else {
            None
        };

        let mut cohorts = BTreeSet::new();
        let mut sums: BTreeMap<(CohortMonth, u32), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        let mut volumes: BTreeMap<CohortMonth, Vec<f64>> = BTreeMap::new();
        let mut skipped = 0usize;

        for (row, period) in periods.iter().enumerate() {
            let Some(cohort) = *period else {
                skipped += 1;
                continue;
            };
            if cutoff.is_some_and(|cutoff| cohort < cutoff) {
                continue;
            }
            cohorts.insert(cohort);

            for (offset, numerators, denominators) in &columns {
                let entry = sums.entry((cohort, *offset)).or_default();
                entry.0.extend(numerators[row]);
                entry.1.extend(denominators[row]);
            }

            if let Some(values) = &volume_source {
                volumes.entry(cohort).or_default().extend(values[row]);
            }
        }

        if skipped > 0 {
            log::warn!("skipped {skipped} fact rows with no origination period");
        }

        let ratios = sums
            .into_iter()
            .map(|(key, (numerators, denominators))| {
                (
                    key,
                    safe_ratio(stable_sum(numerators), stable_sum(denominators)),
                )
            })
            .collect();

        let volume = cohorts
            .iter()
            .map(|&cohort| {
                let total = volume_source.as_ref().map(|_| {
                    stable_sum(volumes.remove(&cohort).unwrap_or_default()).unwrap_or(0.0)
                });
                (cohort, total)
            })
            .collect();

        Ok(Aggregates {
            cohorts,
            ratios,
            volume,
        })
    }

    /// Column layout for the configured alignment.
    fn layout(&self, measures: &MeasureSchema, reference: Option<CohortMonth>) -> Vec<MatrixColumn> {
        let offsets = measures.offsets().iter().map(|pair| pair.offset);

        match (self.alignment, reference) {
            (Alignment::Calendar, Some(reference)) => {
                let mut columns: Vec<MatrixColumn> = offsets
                    .map(|offset| MatrixColumn::calendar(offset, reference))
                    .collect();
                // Most recent calendar month first
                columns.sort_by(|a, b| b.month.cmp(&a.month));
                columns
            }
            (Alignment::TriangularCalendar, Some(reference)) => {
                let mut months = match &self.close_months {
                    Some(months) => months.clone(),
                    None => {
                        let depth = offsets.max().unwrap_or(0);
                        (0..depth).map(|k| reference.minus_months(k)).collect()
                    }
                };
                months.sort();
                months.dedup();
                months.into_iter().map(MatrixColumn::close_month).collect()
            }
            (Alignment::Relative, _) => offsets.map(MatrixColumn::relative).collect(),
            // No origination month to anchor calendar labels on
            (Alignment::Calendar | Alignment::TriangularCalendar, None) => Vec::new(),
        }
    }
}

/// Per-cohort aggregates of the filtered fact table.
#[derive(Debug)]
struct Aggregates {
    cohorts: BTreeSet<CohortMonth>,
    ratios: BTreeMap<(CohortMonth, u32), Option<f64>>,
    volume: BTreeMap<CohortMonth, Option<f64>>,
}

impl Aggregates {
    fn cell(&self, cohort: CohortMonth, column: &MatrixColumn) -> Option<f64> {
        let offset = match (column.offset, column.month) {
            (Some(offset), _) => offset,
            // Close-month column: offset 1 is the origination month itself
            (None, Some(close)) => {
                let elapsed = cohort.months_until(&close);
                if elapsed < 0 {
                    return None;
                }
                u32::try_from(elapsed + 1).ok()?
            }
            (None, None) => return None,
        };
        self.ratios.get(&(cohort, offset)).copied().flatten()
    }
}

/// Order-independent sum; `None` when there is nothing to add.
fn stable_sum(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values.into_iter().sum())
}
