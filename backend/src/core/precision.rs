//! Fixed-precision rounding for reported means and ratios
//!
//! Every floating-point number that leaves the core in a report goes
//! through [`round6`] so two runs over identical inputs serialize to
//! identical bytes.

const SCALE: f64 = 1_000_000.0;

/// Round to 6 decimal places (half away from zero)
///
/// # Example
/// ```
/// use frontline_core::round6;
///
/// assert_eq!(round6(1.23456789), 1.234568);
/// assert_eq!(round6(-0.0000004), 0.0);
/// ```
pub fn round6(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * SCALE).round() / SCALE;
    // Normalize negative zero so it serializes as 0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Ratio rounded to 6 decimals; a zero denominator yields 0
pub fn ratio6(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        round6(numerator / denominator)
    }
}
