//! CSV and JSON export for vintage matrices and exposure breakdowns.
//!
//! Null cells are written as empty CSV fields and as JSON `null`.

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use vintage_matrix::{COHORT_COLUMN, ExposureBar, INITIAL_VOLUME, VintageMatrix};

use crate::format::raw_cell;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced bytes that are not UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        log::debug!("exported {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

/// Serializable view of a matrix: labels instead of typed keys.
#[derive(Debug, Serialize)]
struct MatrixExport<'a> {
    alignment: &'static str,
    reference: Option<String>,
    columns: Vec<&'a str>,
    rows: Vec<MatrixRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct MatrixRecord<'a> {
    cohort: String,
    summary: bool,
    values: &'a [Option<f64>],
    initial_volume: Option<f64>,
}

impl<'a> MatrixExport<'a> {
    fn new(matrix: &'a VintageMatrix) -> Self {
        Self {
            alignment: matrix.alignment().as_str(),
            reference: matrix.reference().map(|m| m.label()),
            columns: matrix.column_labels(),
            rows: matrix
                .rows()
                .iter()
                .map(|row| MatrixRecord {
                    cohort: row.key.label(),
                    summary: row.key.is_summary(),
                    values: &row.cells,
                    initial_volume: row.initial_volume.filter(|v| v.is_finite()),
                })
                .collect(),
        }
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

impl Exporter for VintageMatrix {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);

                let mut header = vec![COHORT_COLUMN];
                header.extend(self.column_labels());
                header.push(INITIAL_VOLUME);
                wtr.write_record(&header)?;

                for row in self.rows() {
                    let mut record = Vec::with_capacity(row.cells.len() + 2);
                    record.push(row.key.label());
                    record.extend(row.cells.iter().map(|c| raw_cell(*c)));
                    record.push(raw_cell(row.initial_volume));
                    wtr.write_record(&record)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&MatrixExport::new(self))?),
            ExportFormat::PrettyJson => {
                Ok(serde_json::to_string_pretty(&MatrixExport::new(self))?)
            }
        }
    }
}

impl Exporter for Vec<ExposureBar> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["cohort", "category", "total"])?;
                for bar in self {
                    wtr.write_record([
                        bar.cohort.label(),
                        bar.category.clone(),
                        raw_cell(Some(bar.total)),
                    ])?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintage_matrix::{Alignment, CohortMonth, MatrixColumn, MatrixRow, RowKey};

    fn month(s: &str) -> CohortMonth {
        CohortMonth::parse(s).unwrap()
    }

    fn matrix() -> VintageMatrix {
        VintageMatrix::new(
            Alignment::Calendar,
            Some(month("2024-02")),
            vec![
                MatrixColumn::calendar(1, month("2024-02")),
                MatrixColumn::calendar(2, month("2024-02")),
            ],
            vec![
                MatrixRow {
                    key: RowKey::Cohort(month("2024-01")),
                    cells: vec![Some(0.25), Some(0.5)],
                    initial_volume: Some(200.0),
                },
                MatrixRow {
                    key: RowKey::Cohort(month("2024-02")),
                    cells: vec![None, Some(0.1)],
                    initial_volume: None,
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_csv_layout() {
        let csv = matrix().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "cohort,2024-02,2024-01,initial_volume");
        assert_eq!(lines[1], "2024-01,0.25,0.5,200");
        assert_eq!(lines[2], "2024-02,,0.1,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_matrix_json_nulls() {
        let json = matrix().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["alignment"], "calendar");
        assert_eq!(value["reference"], "2024-02");
        assert_eq!(value["columns"][0], "2024-02");
        assert_eq!(value["rows"][1]["cohort"], "2024-02");
        assert!(value["rows"][1]["values"][0].is_null());
        assert!(value["rows"][1]["initial_volume"].is_null());
        assert_eq!(value["rows"][0]["summary"], false);
    }

    #[test]
    fn test_matrix_pretty_json() {
        let json = matrix()
            .with_summary(false)
            .export_to_string(ExportFormat::PrettyJson)
            .unwrap();
        assert!(json.contains("  "));
        assert!(json.contains("\"mean\""));
    }

    #[test]
    fn test_exposure_csv() {
        let bars = vec![ExposureBar {
            cohort: month("2024-03"),
            category: "Fisico, Sucursal".to_string(),
            total: 1500.5,
        }];
        let csv = bars.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("cohort,category,total\n"));
        assert!(csv.contains("2024-03,\"Fisico, Sucursal\",1500.5"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.csv");
        matrix().export_to_file(&path, ExportFormat::Csv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("cohort,"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "pretty-json".parse::<ExportFormat>().unwrap(),
            ExportFormat::PrettyJson
        );
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
