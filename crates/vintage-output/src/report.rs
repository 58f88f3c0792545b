//! JSON report envelope around a matrix build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vintage_matrix::MatrixOutcome;

use crate::export::{ExportError, ExportFormat, Exporter};
use crate::table::outcome_message;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Matrix export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// How a matrix build ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// A matrix was built
    Ready,
    /// Filters left no cohorts
    EmptyCohortSet,
    /// No numerator/denominator column pairs
    NoMatchingColumns,
}

impl From<&MatrixOutcome> for ReportStatus {
    fn from(outcome: &MatrixOutcome) -> Self {
        match outcome {
            MatrixOutcome::Ready(_) => Self::Ready,
            MatrixOutcome::EmptyCohortSet { .. } => Self::EmptyCohortSet,
            MatrixOutcome::NoMatchingColumns { .. } => Self::NoMatchingColumns,
        }
    }
}

/// A vintage report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title, usually the business unit and ratio.
    pub title: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Outcome of the build.
    pub status: ReportStatus,

    /// User-facing message when no matrix was produced.
    pub message: Option<String>,

    /// Parameters the matrix was built with.
    pub parameters: serde_json::Value,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(
        title: String,
        status: ReportStatus,
        parameters: serde_json::Value,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            title,
            timestamp: Utc::now(),
            status,
            message: None,
            parameters,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    parameters: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the build parameters.
    pub fn parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Build the report for a matrix outcome.
    ///
    /// Sentinel outcomes produce a report with `null` contents and a message.
    pub fn build(self, outcome: &MatrixOutcome) -> Result<Report, ReportError> {
        let contents = match outcome.matrix() {
            Some(matrix) => serde_json::from_str(&matrix.export_to_string(ExportFormat::Json)?)?,
            None => serde_json::Value::Null,
        };

        let mut report = Report::new(
            self.title.unwrap_or_default(),
            ReportStatus::from(outcome),
            self.parameters.unwrap_or(serde_json::Value::Null),
            contents,
        );
        report.message = outcome_message(outcome);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintage_matrix::{Alignment, CohortMonth, MatrixColumn, MatrixRow, RowKey, VintageMatrix};

    #[test]
    fn test_report_for_matrix() {
        let matrix = VintageMatrix::new(
            Alignment::Relative,
            CohortMonth::new(2024, 1),
            vec![MatrixColumn::relative(1)],
            vec![MatrixRow {
                key: RowKey::Cohort(CohortMonth::new(2024, 1).unwrap()),
                cells: vec![Some(0.2)],
                initial_volume: Some(10.0),
            }],
        )
        .unwrap();

        let report = ReportBuilder::new()
            .title("PR 30+")
            .parameters(serde_json::json!({"max_offset": 1}))
            .build(&MatrixOutcome::Ready(matrix))
            .unwrap();

        assert_eq!(report.title, "PR 30+");
        assert_eq!(report.status, ReportStatus::Ready);
        assert!(report.message.is_none());
        assert_eq!(report.contents["rows"][0]["values"][0], 0.2);
    }

    #[test]
    fn test_report_for_empty_outcome() {
        let report = ReportBuilder::new()
            .build(&MatrixOutcome::EmptyCohortSet { columns: vec![] })
            .unwrap();

        assert_eq!(report.status, ReportStatus::EmptyCohortSet);
        assert!(report.contents.is_null());
        assert!(report.message.is_some());

        let json = report.to_json().unwrap();
        assert!(json.contains("\"empty_cohort_set\""));
    }
}
