//! End-to-end rendering of matrices built from a fact table.

use polars::prelude::*;
use vintage_matrix::{Alignment, CohortRatioMatrixBuilder, Dimension, GroupFilter, MatrixOutcome};
use vintage_output::{
    ExportFormat, Exporter, ReportBuilder, ReportStatus, outcome_message, render_ascii,
    render_markdown,
};

fn facts() -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "origination_period".into(),
            &["2024-01", "2024-01", "2024-02", "2024-03"],
        )
        .into(),
        Series::new("business_unit".into(), &["PR", "PR", "PR", "CONSUMO"]).into(),
        Series::new("npl_1".into(), &[Some(1.0), Some(1.0), Some(3.0), None]).into(),
        Series::new("npl_2".into(), &[Some(2.0), Some(4.0), None, None]).into(),
        Series::new("cap_1".into(), &[10.0, 10.0, 30.0, 5.0]).into(),
        Series::new("cap_2".into(), &[Some(10.0), Some(10.0), None, None]).into(),
    ])
    .unwrap()
}

#[test]
fn test_relative_matrix_to_csv_and_markdown() {
    let matrix = CohortRatioMatrixBuilder::new("npl_", "cap_")
        .max_offset(2)
        .filter(GroupFilter::equals(Dimension::BusinessUnit, "PR"))
        .include_summary(true)
        .build(&facts())
        .unwrap()
        .into_matrix()
        .unwrap();

    let csv = matrix.export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "cohort,Month 1,Month 2,initial_volume");
    assert_eq!(lines[1], "2024-01,0.1,0.3,20");
    assert!(lines[2].starts_with("2024-02,0.1,,"));
    assert!(lines.iter().any(|l| l.starts_with("mean,0.1,0.3,")));

    let md = render_markdown(&matrix, "PR");
    assert!(md.contains("| 2024-01 | 20 | 10.00% | 30.00% |"));
    assert!(!md.contains("None"));
}

#[test]
fn test_calendar_table_headers() {
    let matrix = CohortRatioMatrixBuilder::new("npl_", "cap_")
        .max_offset(2)
        .alignment(Alignment::Calendar)
        .include_summary(false)
        .build(&facts())
        .unwrap()
        .into_matrix()
        .unwrap();

    let table = render_ascii(&matrix, "All units");
    let header = table
        .lines()
        .find(|l| l.starts_with("Cohort"))
        .unwrap()
        .to_string();
    let first = header.find("2024-03").unwrap();
    let second = header.find("2024-02").unwrap();
    assert!(first < second);
}

#[test]
fn test_no_data_outcomes_have_messages() {
    let empty = CohortRatioMatrixBuilder::new("npl_", "cap_")
        .filter(GroupFilter::equals(Dimension::BusinessUnit, "NONE"))
        .build(&facts())
        .unwrap();
    assert!(matches!(empty, MatrixOutcome::EmptyCohortSet { .. }));
    assert!(outcome_message(&empty).is_some());

    let missing = CohortRatioMatrixBuilder::new("saldo_c", "capital_c")
        .build(&facts())
        .unwrap();
    let report = ReportBuilder::new().title("PR").build(&missing).unwrap();
    assert_eq!(report.status, ReportStatus::NoMatchingColumns);
    assert!(report.contents.is_null());
}
