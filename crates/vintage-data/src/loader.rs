//! Reading the fact table from disk.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::error::{DataError, Result};

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl DatasetFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load a fact table, choosing the reader from the file extension.
pub fn load_facts(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let frame = match DatasetFormat::from_path(path)? {
        DatasetFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        DatasetFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
    };

    log::info!(
        "loaded {} rows x {} columns from {}",
        frame.height(),
        frame.width(),
        path.display()
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("vintage.CSV")).unwrap(),
            DatasetFormat::Csv
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("data/vintage.parquet")).unwrap(),
            DatasetFormat::Parquet
        );
        assert!(matches!(
            DatasetFormat::from_path(Path::new("vintage.xlsx")),
            Err(DataError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_facts("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "origination_period,branch,npl_1,cap_1").unwrap();
        writeln!(file, "2024-01,North,5.0,100.0").unwrap();
        writeln!(file, "2024-02,South,,50.0").unwrap();
        drop(file);

        let frame = load_facts(&path).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.column("npl_1").unwrap().null_count(), 1);
    }
}
