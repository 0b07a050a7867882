use std::{fmt, str::FromStr};

use crate::percentiles::compute_percentile;

/// The nine summary statistics reported for every (variable, group) cell.
///
/// The declaration order is the reporting order used by every table and
/// export, see [`Statistic::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Mean,
    Variance,
    StdDev,
    Min,
    Q1,
    Q2,
    Q3,
    Max,
    CvPercent,
}

impl Statistic {
    /// All statistics in reporting order.
    pub const ALL: [Self; 9] = [
        Self::Mean,
        Self::Variance,
        Self::StdDev,
        Self::Min,
        Self::Q1,
        Self::Q2,
        Self::Q3,
        Self::Max,
        Self::CvPercent,
    ];

    /// Short label used in table headers and CSV files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Variance => "var",
            Self::StdDev => "std",
            Self::Min => "min",
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Max => "max",
            Self::CvPercent => "cv (%)",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.label(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown statistic '{name}' (expected one of mean, var, std, min, Q1, Q2, Q3, max, cv)")]
pub struct ParseStatisticError {
    pub name: String,
}

impl FromStr for Statistic {
    type Err = ParseStatisticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stat = match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Self::Mean,
            "var" | "variance" => Self::Variance,
            "std" | "stddev" | "std_dev" => Self::StdDev,
            "min" => Self::Min,
            "q1" => Self::Q1,
            "q2" | "median" => Self::Q2,
            "q3" => Self::Q3,
            "max" => Self::Max,
            "cv" | "cv%" | "cv (%)" => Self::CvPercent,
            _ => {
                return Err(ParseStatisticError { name: s.to_owned() });
            }
        };
        Ok(stat)
    }
}

/// Returned when statistics are requested for an empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot summarize an empty sample")]
pub struct EmptySampleError;

/// Summary statistics of one sample, rounded to two decimals.
///
/// Variance and standard deviation use the sample convention (`n - 1`
/// denominator) and are `None` for a single observation. The coefficient of
/// variation is `None` whenever it is undefined: a zero mean or an undefined
/// standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSummary {
    pub mean: f64,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub max: f64,
    pub cv_percent: Option<f64>,
}

impl StatsSummary {
    /// Summarizes unsorted values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tidystat_stats::descriptive::StatsSummary;
    /// let stats = StatsSummary::new([4.0, 1.0, 3.0, 2.0]).unwrap();
    /// assert_eq!(stats.mean, 2.5);
    /// assert_eq!(stats.q1, 1.75);
    /// assert_eq!(stats.std_dev, Some(1.29));
    /// assert_eq!(stats.cv_percent, Some(51.64));
    /// ```
    pub fn new<I>(values: I) -> Result<Self, EmptySampleError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Summarizes values already sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    pub fn from_sorted(sorted_values: &[f64]) -> Result<Self, EmptySampleError> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let (&min, &max) = sorted_values
            .first()
            .zip(sorted_values.last())
            .ok_or(EmptySampleError)?;
        let n = sorted_values.len() as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let variance = (sorted_values.len() > 1).then(|| {
            sorted_values
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        });
        let std_dev = variance.map(f64::sqrt);
        // A mean that rounds to zero is reported as zero, so the CV is
        // undefined as well.
        let cv_percent = std_dev
            .filter(|_| round2(mean) != 0.0)
            .map(|std_dev| 100.0 * std_dev / mean);
        let quartile = |p: f64| compute_percentile(sorted_values, p);

        Ok(Self {
            mean: round2(mean),
            variance: variance.map(round2),
            std_dev: std_dev.map(round2),
            min: round2(min),
            q1: round2(quartile(25.0)),
            q2: round2(quartile(50.0)),
            q3: round2(quartile(75.0)),
            max: round2(max),
            cv_percent: cv_percent.map(round2),
        })
    }

    /// Returns the value of one statistic, `None` when it is undefined.
    #[must_use]
    pub fn get(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Mean => Some(self.mean),
            Statistic::Variance => self.variance,
            Statistic::StdDev => self.std_dev,
            Statistic::Min => Some(self.min),
            Statistic::Q1 => Some(self.q1),
            Statistic::Q2 => Some(self.q2),
            Statistic::Q3 => Some(self.q3),
            Statistic::Max => Some(self.max),
            Statistic::CvPercent => self.cv_percent,
        }
    }

    /// Iterates over `(statistic, value)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Statistic, Option<f64>)> + '_ {
        Statistic::ALL
            .into_iter()
            .map(|stat| (stat, self.get(stat)))
    }
}

/// Rounds to two decimals, ties to even.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_reference_scenario_group_a() {
        let stats = StatsSummary::new([1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.variance, Some(1.67));
        assert_eq!(stats.std_dev, Some(1.29));
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.q2, 2.5);
        assert_eq!(stats.q3, 3.25);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.cv_percent, Some(51.64));
    }

    #[test]
    fn test_reference_scenario_group_b() {
        let stats = StatsSummary::new([5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(stats.mean, 6.5);
        assert_eq!(stats.q1, 5.75);
        assert_eq!(stats.q3, 7.25);
        assert_eq!(stats.std_dev, Some(1.29));
        assert_eq!(stats.cv_percent, Some(19.86));
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(StatsSummary::new([]), Err(EmptySampleError));
    }

    #[test]
    fn test_single_value_has_undefined_dispersion() {
        let stats = StatsSummary::new([3.0]).unwrap();
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.variance, None);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.cv_percent, None);
        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.q3, 3.0);
    }

    #[test]
    fn test_zero_mean_cv_is_undefined() {
        let stats = StatsSummary::new([-1.0, 1.0]).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, Some(1.41));
        assert_eq!(stats.cv_percent, None);
        assert_eq!(stats.get(Statistic::CvPercent), None);
    }

    #[test]
    fn test_near_zero_mean_cv_is_undefined() {
        let stats = StatsSummary::new([0.1, 0.2, -0.3]).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, Some(0.26));
        assert_eq!(stats.cv_percent, None);
    }

    #[test]
    fn test_constant_sample_has_zero_cv() {
        let stats = StatsSummary::new([2.0, 2.0, 2.0]).unwrap();
        assert_eq!(stats.variance, Some(0.0));
        assert_eq!(stats.cv_percent, Some(0.0));
    }

    #[test]
    fn test_iter_follows_reporting_order() {
        let stats = StatsSummary::new([1.0, 2.0, 3.0, 4.0]).unwrap();
        let labels = stats.iter().map(|(s, _)| s.label()).collect::<Vec<_>>();
        assert_eq!(labels.join(","), "mean,var,std,min,Q1,Q2,Q3,max,cv (%)");
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(51.639_777), 51.64);
    }

    #[test]
    fn test_parse_statistic() {
        assert_eq!("Q3".parse::<Statistic>(), Ok(Statistic::Q3));
        assert_eq!("median".parse::<Statistic>(), Ok(Statistic::Q2));
        assert_eq!("cv (%)".parse::<Statistic>(), Ok(Statistic::CvPercent));
        assert_eq!("STD".parse::<Statistic>(), Ok(Statistic::StdDev));
        assert!("mode".parse::<Statistic>().is_err());
        for stat in Statistic::ALL {
            assert_eq!(stat.label().parse::<Statistic>(), Ok(stat));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_order_statistics_are_monotonic(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
        ) {
            let stats = StatsSummary::new(values).unwrap();
            prop_assert!(stats.min <= stats.q1);
            prop_assert!(stats.q1 <= stats.q2);
            prop_assert!(stats.q2 <= stats.q3);
            prop_assert!(stats.q3 <= stats.max);
            prop_assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        }

        #[test]
        fn prop_summary_is_order_independent(
            mut values in prop::collection::vec(-1.0e3f64..1.0e3, 1..32),
        ) {
            let forward = StatsSummary::new(values.clone()).unwrap();
            values.reverse();
            let backward = StatsSummary::new(values).unwrap();
            prop_assert_eq!(forward.min, backward.min);
            prop_assert_eq!(forward.q2, backward.q2);
            prop_assert_eq!(forward.max, backward.max);
        }
    }
}
