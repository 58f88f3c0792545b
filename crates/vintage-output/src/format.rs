//! Cell formatting.
//!
//! Null cells always format as an empty string.

/// Format a ratio as a percentage with two decimals, or `""` when undefined.
///
/// # Examples
///
/// ```
/// use vintage_output::format_ratio;
///
/// assert_eq!(format_ratio(Some(0.1234)), "12.34%");
/// assert_eq!(format_ratio(None), "");
/// ```
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => String::new(),
    }
}

/// Format an amount with thousands separators and no decimals, or `""` when absent.
///
/// # Examples
///
/// ```
/// use vintage_output::format_amount;
///
/// assert_eq!(format_amount(Some(1_234_567.4)), "1,234,567");
/// assert_eq!(format_amount(Some(-950.0)), "-950");
/// assert_eq!(format_amount(None), "");
/// ```
pub fn format_amount(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return String::new();
    };

    let rounded = format!("{:.0}", v.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if v < 0.0 && grouped != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Raw cell text for machine-readable output: the number, or `""` when null.
pub(crate) fn raw_cell(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(0.0), "0.00%")]
    #[case(Some(0.5), "50.00%")]
    #[case(Some(1.25), "125.00%")]
    #[case(Some(f64::NAN), "")]
    #[case(None, "")]
    fn test_format_ratio(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_ratio(value), expected);
    }

    #[rstest]
    #[case(Some(0.0), "0")]
    #[case(Some(999.0), "999")]
    #[case(Some(1000.0), "1,000")]
    #[case(Some(123_456.0), "123,456")]
    #[case(Some(-0.2), "0")]
    #[case(Some(f64::INFINITY), "")]
    #[case(None, "")]
    fn test_format_amount(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_amount(value), expected);
    }

    #[test]
    fn test_null_never_renders_as_none() {
        assert!(!format_ratio(None).contains("None"));
        assert!(!format_amount(None).contains("None"));
        assert!(raw_cell(None).is_empty());
    }
}
