/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest order statistics.
/// The percentile `p` maps to the fractional position `(n - 1) * p / 100`
/// in the sorted values; the result is interpolated between the values at
/// the floor and ceiling of that position. This is the inclusive
/// ("linear") method, so P0 is the minimum and P100 the maximum.
///
/// # Returns
///
/// The value at the specified percentile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use tidystat_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
///
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 25.0), 1.75);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let Some(last) = sorted_values.len().checked_sub(1) else {
        return f64::NAN;
    };
    let fraction = percentile.clamp(0.0, 100.0) / 100.0;
    let position = last as f64 * fraction;
    let lower = (position.floor() as usize).min(last);
    let upper = (position.ceil() as usize).min(last);
    let weight = position - lower as f64;
    let lower_value = sorted_values[lower];
    let upper_value = sorted_values[upper];
    lower_value + (upper_value - lower_value) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value() {
        let values = [7.0];
        for p in [0.0, 25.0, 50.0, 75.0, 100.0] {
            assert_eq!(compute_percentile(&values, p), 7.0);
        }
    }

    #[test]
    fn test_empty_values_is_nan() {
        assert!(compute_percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_odd_length_median() {
        let values = [1.0, 3.0, 8.0];
        assert_eq!(compute_percentile(&values, 50.0), 3.0);
        assert_eq!(compute_percentile(&values, 25.0), 2.0);
        assert_eq!(compute_percentile(&values, 75.0), 5.5);
    }
}
