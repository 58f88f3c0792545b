//! The vintage matrix value type.
//!
//! A [`VintageMatrix`] is rectangular: every row carries exactly one cell per
//! column plus an `initial_volume` value. Cells are `Option<f64>`; `None` is
//! an undefined ratio and must be rendered as an empty cell.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MatrixError, Result};
use crate::month::CohortMonth;
use crate::summary::{SummaryKind, summarize};

/// Name of the auxiliary origination-volume column.
pub const INITIAL_VOLUME: &str = "initial_volume";

/// Name of the row-label column in [`VintageMatrix::to_dataframe`].
pub const COHORT_COLUMN: &str = "cohort";

/// How matrix columns relate to time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Columns are maturity offsets ("Month 1", "Month 2", ...)
    #[default]
    Relative,
    /// Offset columns relabelled with the calendar month `reference - (m - 1)`
    Calendar,
    /// Origination month x close month grid, masked below the diagonal
    TriangularCalendar,
}

impl Alignment {
    /// Stable snake_case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Calendar => "calendar",
            Self::TriangularCalendar => "triangular_calendar",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = MatrixError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "relative" | "offset" => Ok(Self::Relative),
            "calendar" => Ok(Self::Calendar),
            "triangular_calendar" | "triangular" | "triangle" => Ok(Self::TriangularCalendar),
            other => Err(MatrixError::InvalidParameter(format!(
                "unknown alignment: {other}"
            ))),
        }
    }
}

/// A matrix column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixColumn {
    /// Display label, unique within the matrix
    pub label: String,
    /// Maturity offset, absent in triangular mode
    pub offset: Option<u32>,
    /// Calendar month, absent in relative mode
    pub month: Option<CohortMonth>,
}

impl MatrixColumn {
    /// Column for offset `m` in relative alignment.
    pub fn relative(offset: u32) -> Self {
        Self {
            label: format!("Month {offset}"),
            offset: Some(offset),
            month: None,
        }
    }

    /// Column for offset `m` relabelled to `reference - (m - 1)` months.
    pub fn calendar(offset: u32, reference: CohortMonth) -> Self {
        let month = reference.minus_months(offset.saturating_sub(1));
        Self {
            label: month.label(),
            offset: Some(offset),
            month: Some(month),
        }
    }

    /// Close-month column of a triangular grid.
    pub fn close_month(month: CohortMonth) -> Self {
        Self {
            label: month.label(),
            offset: None,
            month: Some(month),
        }
    }
}

/// Identity of a matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKey {
    /// A cohort, keyed by origination month
    Cohort(CohortMonth),
    /// A trailing summary row
    Summary(SummaryKind),
}

impl RowKey {
    /// Display label: `YYYY-MM` for cohorts, `mean`/`max`/`min` for summaries.
    pub fn label(&self) -> String {
        match self {
            Self::Cohort(month) => month.label(),
            Self::Summary(kind) => kind.as_str().to_string(),
        }
    }

    /// True for summary rows.
    pub const fn is_summary(&self) -> bool {
        matches!(self, Self::Summary(_))
    }
}

/// A matrix row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Row identity
    pub key: RowKey,
    /// One cell per matrix column
    pub cells: Vec<Option<f64>>,
    /// Origination volume of the cohort
    pub initial_volume: Option<f64>,
}

/// Cohort x maturity ratio matrix.
///
/// Deserialization goes through [`VintageMatrix::new`], so ragged input is
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVintageMatrix")]
pub struct VintageMatrix {
    alignment: Alignment,
    reference: Option<CohortMonth>,
    columns: Vec<MatrixColumn>,
    rows: Vec<MatrixRow>,
}

/// Unchecked wire form of [`VintageMatrix`].
#[derive(Deserialize)]
struct RawVintageMatrix {
    alignment: Alignment,
    reference: Option<CohortMonth>,
    columns: Vec<MatrixColumn>,
    rows: Vec<MatrixRow>,
}

impl TryFrom<RawVintageMatrix> for VintageMatrix {
    type Error = MatrixError;

    fn try_from(raw: RawVintageMatrix) -> Result<Self> {
        Self::new(raw.alignment, raw.reference, raw.columns, raw.rows)
    }
}

impl VintageMatrix {
    /// Assemble a matrix, checking that every row matches the column count.
    pub fn new(
        alignment: Alignment,
        reference: Option<CohortMonth>,
        columns: Vec<MatrixColumn>,
        rows: Vec<MatrixRow>,
    ) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.cells.len() != columns.len()) {
            return Err(MatrixError::InvalidParameter(format!(
                "row {} has {} cells for {} columns",
                row.key.label(),
                row.cells.len(),
                columns.len()
            )));
        }

        Ok(Self {
            alignment,
            reference,
            columns,
            rows,
        })
    }

    /// Column alignment.
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Latest origination month of the unfiltered dataset.
    pub const fn reference(&self) -> Option<CohortMonth> {
        self.reference
    }

    /// Ratio columns, in display order.
    pub fn columns(&self) -> &[MatrixColumn] {
        &self.columns
    }

    /// Ratio column labels, in display order.
    pub fn column_labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// All rows: cohorts first, then summary rows.
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Cohort rows, ascending by origination month.
    pub fn cohort_rows(&self) -> impl Iterator<Item = &MatrixRow> {
        self.rows.iter().filter(|r| !r.key.is_summary())
    }

    /// Trailing summary rows.
    pub fn summary_rows(&self) -> impl Iterator<Item = &MatrixRow> {
        self.rows.iter().filter(|r| r.key.is_summary())
    }

    /// Number of cohort rows.
    pub fn cohort_count(&self) -> usize {
        self.cohort_rows().count()
    }

    /// True when the matrix has no cohort rows.
    pub fn is_empty(&self) -> bool {
        self.cohort_count() == 0
    }

    /// Row for a cohort.
    pub fn cohort(&self, month: CohortMonth) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| r.key == RowKey::Cohort(month))
    }

    /// Summary row of the given kind, if summaries were appended.
    pub fn summary(&self, kind: SummaryKind) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| r.key == RowKey::Summary(kind))
    }

    /// Index of the column with `label`.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// Cell at (`row`, `column`) by label. `None` for null cells and unknown labels.
    pub fn value(&self, row: &str, column: &str) -> Option<f64> {
        let index = self.column_index(column)?;
        self.rows
            .iter()
            .find(|r| r.key.label() == row)
            .and_then(|r| r.cells.get(index).copied().flatten())
    }

    /// One column as a (row label, cell) series over the cohort rows.
    pub fn column_series(&self, column: &str) -> Option<Vec<(String, Option<f64>)>> {
        let index = self.column_index(column)?;
        Some(
            self.cohort_rows()
                .map(|r| (r.key.label(), r.cells.get(index).copied().flatten()))
                .collect(),
        )
    }

    /// Replace any summary rows with freshly computed `mean`, `max` and `min` rows.
    ///
    /// Summaries only read cohort rows, so repeated calls give the same result.
    #[must_use]
    pub fn with_summary(mut self, summarize_volume: bool) -> Self {
        self.rows.retain(|r| !r.key.is_summary());
        let summaries = summarize(&self.rows, self.columns.len(), summarize_volume);
        self.rows.extend(summaries);
        self
    }

    /// Convert to a polars frame: a `cohort` label column, one nullable
    /// `f64` column per ratio column, then `initial_volume`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 2);

        let labels: Vec<String> = self.rows.iter().map(|r| r.key.label()).collect();
        columns.push(Series::new(COHORT_COLUMN.into(), labels).into());

        for (index, column) in self.columns.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|r| r.cells.get(index).copied().flatten())
                .collect();
            columns.push(Series::new(column.label.as_str().into(), values).into());
        }

        let volumes: Vec<Option<f64>> = self.rows.iter().map(|r| r.initial_volume).collect();
        columns.push(Series::new(INITIAL_VOLUME.into(), volumes).into());

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> CohortMonth {
        CohortMonth::parse(s).unwrap()
    }

    fn sample() -> VintageMatrix {
        VintageMatrix::new(
            Alignment::Relative,
            Some(month("2024-02")),
            vec![MatrixColumn::relative(1), MatrixColumn::relative(2)],
            vec![
                MatrixRow {
                    key: RowKey::Cohort(month("2024-01")),
                    cells: vec![Some(0.1), Some(0.2)],
                    initial_volume: Some(100.0),
                },
                MatrixRow {
                    key: RowKey::Cohort(month("2024-02")),
                    cells: vec![Some(0.3), None],
                    initial_volume: Some(50.0),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = VintageMatrix::new(
            Alignment::Relative,
            None,
            vec![MatrixColumn::relative(1)],
            vec![MatrixRow {
                key: RowKey::Cohort(month("2024-01")),
                cells: vec![Some(0.1), Some(0.2)],
                initial_volume: None,
            }],
        )
        .unwrap_err();
        assert!(matches!(err, MatrixError::InvalidParameter(_)));
    }

    #[test]
    fn test_deserialize_checks_row_width() {
        let matrix = sample();
        let json = serde_json::to_value(&matrix).unwrap();
        let restored: VintageMatrix = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, matrix);

        let mut ragged = json;
        ragged["rows"][0]["cells"] = serde_json::json!([0.1]);
        let err = serde_json::from_value::<VintageMatrix>(ragged).unwrap_err();
        assert!(err.to_string().contains("has 1 cells for 2 columns"));
    }

    #[test]
    fn test_value_lookup() {
        let matrix = sample();
        assert_eq!(matrix.value("2024-01", "Month 2"), Some(0.2));
        assert_eq!(matrix.value("2024-02", "Month 2"), None);
        assert_eq!(matrix.value("2023-12", "Month 1"), None);
        assert_eq!(matrix.value("2024-01", "Month 9"), None);
    }

    #[test]
    fn test_calendar_column_label() {
        let column = MatrixColumn::calendar(3, month("2024-02"));
        assert_eq!(column.label, "2023-12");
        assert_eq!(column.offset, Some(3));
    }

    #[test]
    fn test_with_summary_is_idempotent() {
        let once = sample().with_summary(false);
        let twice = once.clone().with_summary(false);
        assert_eq!(once, twice);
        assert_eq!(once.cohort_count(), 2);
        assert_eq!(once.summary_rows().count(), 3);
    }

    #[test]
    fn test_to_dataframe_shape_and_nulls() {
        let df = sample().with_summary(false).to_dataframe().unwrap();
        assert_eq!(df.height(), 5);
        assert_eq!(df.width(), 4);

        let month_two = df.column("Month 2").unwrap().f64().unwrap();
        assert_eq!(month_two.get(1), None);
        assert_eq!(month_two.null_count(), 1);
    }

    #[test]
    fn test_column_series() {
        let series = sample().column_series("Month 1").unwrap();
        assert_eq!(
            series,
            vec![
                ("2024-01".to_string(), Some(0.1)),
                ("2024-02".to_string(), Some(0.3))
            ]
        );
    }

    #[test]
    fn test_alignment_from_str() {
        assert_eq!("calendar".parse::<Alignment>().unwrap(), Alignment::Calendar);
        assert_eq!(
            "triangular".parse::<Alignment>().unwrap(),
            Alignment::TriangularCalendar
        );
        assert!("diagonal".parse::<Alignment>().is_err());
    }
}
