//! Null-safe ratio arithmetic.
//!
//! Every cell of a vintage matrix is produced by [`safe_ratio`]. A zero,
//! negative or absent denominator produces `None` rather than an error, an
//! infinity or a silent zero.

/// Divide `numerator` by `denominator`, returning `None` when the ratio is undefined.
///
/// The rules are:
/// - an absent denominator is treated as zero;
/// - a denominator that is not strictly positive (including NaN) yields `None`;
/// - an absent numerator is treated as zero;
/// - a negative or NaN numerator yields `None`;
/// - a quotient that is not finite yields `None`.
///
/// # Examples
///
/// ```
/// use vintage_matrix::safe_ratio;
///
/// assert_eq!(safe_ratio(Some(50.0), Some(100.0)), Some(0.5));
/// assert_eq!(safe_ratio(Some(50.0), Some(0.0)), None);
/// assert_eq!(safe_ratio(Some(50.0), None), None);
/// assert_eq!(safe_ratio(None, Some(100.0)), Some(0.0));
/// ```
pub fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let denominator = denominator.unwrap_or(0.0);
    if denominator.is_nan() || denominator <= 0.0 {
        return None;
    }

    let numerator = numerator.unwrap_or(0.0);
    if numerator.is_nan() || numerator < 0.0 {
        return None;
    }

    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}
