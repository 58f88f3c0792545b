//! Text tables for terminals and documentation.

use vintage_matrix::{ExposureBar, MatrixOutcome, VintageMatrix};

use crate::format::{format_amount, format_ratio};

const LABEL_WIDTH: usize = 10;
const VOLUME_HEADER: &str = "Volume";

/// User-facing message for outcomes that carry no matrix.
///
/// Returns `None` for [`MatrixOutcome::Ready`].
pub fn outcome_message(outcome: &MatrixOutcome) -> Option<String> {
    match outcome {
        MatrixOutcome::Ready(_) => None,
        MatrixOutcome::EmptyCohortSet { .. } => {
            Some("No cohorts match the current filters.".to_string())
        }
        MatrixOutcome::NoMatchingColumns {
            numerator_prefix,
            denominator_prefix,
        } => Some(format!(
            "Vintage matrix unavailable: no {numerator_prefix}N / {denominator_prefix}N column pairs found."
        )),
    }
}

/// Render a matrix as a fixed-width ASCII table.
///
/// Ratios are shown as percentages, `initial_volume` with thousands
/// separators, and null cells are blank.
pub fn render_ascii(matrix: &VintageMatrix, title: &str) -> String {
    let header: Vec<String> = matrix
        .columns()
        .iter()
        .map(|c| c.label.clone())
        .collect();
    let rows: Vec<(String, Vec<String>, String)> = matrix
        .rows()
        .iter()
        .map(|row| {
            (
                row.key.label(),
                row.cells.iter().map(|c| format_ratio(*c)).collect(),
                format_amount(row.initial_volume),
            )
        })
        .collect();

    let cell_width = header
        .iter()
        .map(String::len)
        .chain(rows.iter().flat_map(|(_, cells, _)| cells.iter().map(String::len)))
        .max()
        .unwrap_or(0)
        .max(7);
    let volume_width = rows
        .iter()
        .map(|(_, _, v)| v.len())
        .max()
        .unwrap_or(0)
        .max(VOLUME_HEADER.len());
    let total_width = LABEL_WIDTH + 1 + volume_width + header.len() * (cell_width + 1);

    let mut output = String::new();
    output.push_str(&format!("\n{title} ({})\n", matrix.alignment()));
    output.push_str(&"=".repeat(total_width));
    output.push('\n');

    output.push_str(&format!(
        "{:<LABEL_WIDTH$} {:>volume_width$}",
        "Cohort", VOLUME_HEADER
    ));
    for label in &header {
        output.push_str(&format!(" {label:>cell_width$}"));
    }
    output.push('\n');
    output.push_str(&"-".repeat(total_width));
    output.push('\n');

    let mut in_summary = false;
    for ((label, cells, volume), row) in rows.iter().zip(matrix.rows()) {
        if row.key.is_summary() && !in_summary {
            output.push_str(&"-".repeat(total_width));
            output.push('\n');
            in_summary = true;
        }
        output.push_str(&format!("{label:<LABEL_WIDTH$} {volume:>volume_width$}"));
        for cell in cells {
            output.push_str(&format!(" {cell:>cell_width$}"));
        }
        output.push('\n');
    }

    output.push_str(&"=".repeat(total_width));
    output.push('\n');
    output
}

/// Render a matrix as a Markdown table.
pub fn render_markdown(matrix: &VintageMatrix, title: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {title}\n\n"));
    output.push_str(&format!("**Alignment:** {}\n", matrix.alignment()));
    if let Some(reference) = matrix.reference() {
        output.push_str(&format!("**Reference month:** {reference}\n"));
    }
    output.push('\n');

    output.push_str("| Cohort | Volume |");
    for label in matrix.column_labels() {
        output.push_str(&format!(" {label} |"));
    }
    output.push('\n');
    output.push_str("|--------|-------:|");
    for _ in matrix.columns() {
        output.push_str("------:|");
    }
    output.push('\n');

    for row in matrix.rows() {
        let label = if row.key.is_summary() {
            format!("**{}**", row.key.label())
        } else {
            row.key.label()
        };
        output.push_str(&format!("| {label} | {} |", format_amount(row.initial_volume)));
        for cell in &row.cells {
            output.push_str(&format!(" {} |", format_ratio(*cell)));
        }
        output.push('\n');
    }

    output
}

/// Render exposure bars as an ASCII table, one line per cohort and category.
pub fn render_exposure(bars: &[ExposureBar], title: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{title}\n"));
    output.push_str(&"=".repeat(60));
    output.push('\n');

    if bars.is_empty() {
        output.push_str("No data for the current filters.\n");
        return output;
    }

    output.push_str(&format!(
        "{:<10} {:<24} {:>24}\n",
        "Cohort", "Category", "Total"
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for bar in bars {
        output.push_str(&format!(
            "{:<10} {:<24} {:>24}\n",
            bar.cohort.label(),
            bar.category,
            format_amount(Some(bar.total))
        ));
    }
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use vintage_matrix::{
        Alignment, CohortMonth, MatrixColumn, MatrixRow, RowKey, VintageMatrix,
    };

    fn matrix() -> VintageMatrix {
        let month = |s: &str| CohortMonth::parse(s).unwrap();
        VintageMatrix::new(
            Alignment::Relative,
            Some(month("2024-02")),
            vec![MatrixColumn::relative(1), MatrixColumn::relative(2)],
            vec![
                MatrixRow {
                    key: RowKey::Cohort(month("2024-01")),
                    cells: vec![Some(0.05), Some(0.125)],
                    initial_volume: Some(1_500_000.0),
                },
                MatrixRow {
                    key: RowKey::Cohort(month("2024-02")),
                    cells: vec![Some(0.1), None],
                    initial_volume: Some(20_000.0),
                },
            ],
        )
        .unwrap()
        .with_summary(false)
    }

    #[test]
    fn test_ascii_table() {
        let table = render_ascii(&matrix(), "Delinquency 30+");
        assert!(table.contains("Delinquency 30+ (relative)"));
        assert!(table.contains("Month 1"));
        assert!(table.contains("12.50%"));
        assert!(table.contains("1,500,000"));
        assert!(table.contains("mean"));
        assert!(!table.contains("None"));
    }

    #[test]
    fn test_ascii_rows_are_aligned() {
        let table = render_ascii(&matrix(), "t");
        let widths: Vec<usize> = table
            .lines()
            .filter(|l| l.starts_with("2024-") || l.starts_with("Cohort"))
            .map(str::len)
            .collect();
        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_markdown_blank_nulls() {
        let md = render_markdown(&matrix(), "Vintage");
        assert!(md.contains("# Vintage"));
        assert!(md.contains("| Cohort | Volume | Month 1 | Month 2 |"));
        assert!(md.contains("| 2024-02 | 20,000 | 10.00% |  |"));
        assert!(md.contains("| **max** |"));
        assert!(!md.contains("None"));
    }

    #[test]
    fn test_outcome_messages() {
        let empty = MatrixOutcome::EmptyCohortSet { columns: vec![] };
        assert!(outcome_message(&empty).unwrap().contains("No cohorts"));

        let unavailable = MatrixOutcome::NoMatchingColumns {
            numerator_prefix: "saldo_c".to_string(),
            denominator_prefix: "capital_c".to_string(),
        };
        assert!(outcome_message(&unavailable).unwrap().contains("capital_cN"));

        assert!(outcome_message(&MatrixOutcome::Ready(matrix())).is_none());
    }

    #[test]
    fn test_exposure_table() {
        let bars = vec![ExposureBar {
            cohort: CohortMonth::parse("2024-01").unwrap(),
            category: "Digital".to_string(),
            total: 12_345.0,
        }];
        let table = render_exposure(&bars, "Exposure by channel");
        assert!(table.contains("Digital"));
        assert!(table.contains("12,345"));
        assert!(render_exposure(&[], "x").contains("No data"));
    }
}
