use crate::percentiles::compute_percentile;

/// Whisker reach as a multiple of the interquartile range.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Five-number summary plus outliers, as drawn by a box-and-whisker plot.
///
/// Quartiles use the same linear interpolation as
/// [`StatsSummary`](crate::descriptive::StatsSummary) but are not rounded.
/// Whiskers extend to the most extreme observations within
/// `1.5 * IQR` of the box; anything beyond is reported as an outlier.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Computes box statistics from unsorted values.
    ///
    /// Returns `None` for an empty sample.
    ///
    /// ```
    /// # use tidystat_stats::boxplot::BoxStats;
    /// let stats = BoxStats::new([1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.whisker_high, 4.0);
    /// assert_eq!(stats.outliers, vec![100.0]);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Computes box statistics from values sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        if sorted_values.is_empty() {
            return None;
        }

        let q1 = compute_percentile(sorted_values, 25.0);
        let median = compute_percentile(sorted_values, 50.0);
        let q3 = compute_percentile(sorted_values, 75.0);
        let reach = WHISKER_IQR_FACTOR * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let inside = || {
            sorted_values
                .iter()
                .copied()
                .filter(|v| (low_fence..=high_fence).contains(v))
        };
        let whisker_low = inside().next().unwrap_or(q1);
        let whisker_high = inside().last().unwrap_or(q3);
        let outliers = sorted_values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Lowest and highest point drawn for this box, outliers included.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        let low = self
            .outliers
            .iter()
            .copied()
            .fold(self.whisker_low, f64::min);
        let high = self
            .outliers
            .iter()
            .copied()
            .fold(self.whisker_high, f64::max);
        (low, high)
    }
}
