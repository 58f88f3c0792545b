//! Loading fact tables from disk through the cache.

use polars::prelude::*;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use vintage_data::{DataError, DatasetCache, load_facts};

fn sample() -> DataFrame {
    DataFrame::new(vec![
        Series::new("origination_period".into(), &["2024-01", "2024-02"]).into(),
        Series::new("business_unit".into(), &["PR", "CONSUMO"]).into(),
        Series::new("npl_1".into(), &[Some(1.5), None]).into(),
        Series::new("cap_1".into(), &[10.0, 20.0]).into(),
    ])
    .unwrap()
}

#[test]
fn test_parquet_and_csv_load_the_same_table() {
    let dir = tempfile::tempdir().unwrap();

    let parquet_path = dir.path().join("facts.parquet");
    let mut frame = sample();
    ParquetWriter::new(File::create(&parquet_path).unwrap())
        .finish(&mut frame)
        .unwrap();

    let csv_path = dir.path().join("facts.csv");
    CsvWriter::new(File::create(&csv_path).unwrap())
        .finish(&mut frame)
        .unwrap();

    let from_parquet = load_facts(&parquet_path).unwrap();
    let from_csv = load_facts(&csv_path).unwrap();

    assert_eq!(from_parquet.shape(), (2, 4));
    assert_eq!(from_csv.shape(), (2, 4));
    assert_eq!(from_parquet.column("npl_1").unwrap().null_count(), 1);
    assert_eq!(from_csv.column("npl_1").unwrap().null_count(), 1);
}

#[test]
fn test_cache_serves_shared_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facts.parquet");
    let mut frame = sample();
    ParquetWriter::new(File::create(&path).unwrap())
        .finish(&mut frame)
        .unwrap();

    let mut cache = DatasetCache::with_ttl(Duration::from_secs(600));
    let first = cache.get_or_load(&path).unwrap();
    let second = cache.get_or_load(&path).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats().loads, 1);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facts.xlsx");
    std::fs::write(&path, "not a spreadsheet").unwrap();

    assert!(matches!(
        load_facts(&path),
        Err(DataError::UnsupportedFormat(_))
    ));
}
