//! Regression between two columns of the observation table
//!
//! [`run`] fits `y = slope * x + intercept` over the records where both
//! columns have a value and reports covariance and correlation alongside the
//! fit. [`StepByStepCheck`] repeats the covariance and correlation by hand
//! from the rounded summaries, the way they are computed on paper, and
//! compares the two.

use std::fmt;

use tidystat_stats::{
    descriptive::{StatsSummary, round2},
    regression::{self, LinearFit, RegressionError},
};

use crate::table::{ObservationTable, TableError};

/// Largest difference between the rounded hand and library values still
/// reported as agreement.
pub const STEP_BY_STEP_TOLERANCE: f64 = 0.01;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RegressionAnalysisError {
    #[display("{source}")]
    Table { source: TableError },
    #[display("regression of '{y}' on '{x}' needs at least 2 complete pairs (got {len})")]
    TooFewPairs { x: String, y: String, len: usize },
    #[display("column '{column}' has zero variance")]
    ZeroVariance { column: String },
    #[display("{source}")]
    Fit { source: RegressionError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionReport {
    pub x: String,
    pub y: String,
    /// Complete pairs used by the fit.
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
    /// Sample covariance.
    pub covariance: f64,
    /// Pearson correlation coefficient.
    pub correlation: f64,
    pub fit: LinearFit,
}

/// Regresses column `y` on column `x`.
///
/// # Examples
///
/// ```
/// use tidystat_analysis::{regression, table::ObservationTable};
///
/// let table = ObservationTable::from_rows(
///     ["x", "y"],
///     [vec!["1", "2"], vec!["2", "4"], vec!["3", "6"]],
/// );
/// let report = regression::run(&table, "x", "y").unwrap();
/// assert!((report.fit.slope - 2.0).abs() < 1e-12);
/// assert!((report.correlation - 1.0).abs() < 1e-12);
/// ```
pub fn run(
    table: &ObservationTable,
    x: &str,
    y: &str,
) -> Result<RegressionReport, RegressionAnalysisError> {
    let (x_values, y_values) = table
        .paired_values(x, y)
        .map_err(|source| RegressionAnalysisError::Table { source })?;
    if x_values.len() < 2 {
        return Err(RegressionAnalysisError::TooFewPairs {
            x: x.to_owned(),
            y: y.to_owned(),
            len: x_values.len(),
        });
    }
    for (column, values) in [(x, &x_values), (y, &y_values)] {
        if values.iter().all(|v| *v == values[0]) {
            return Err(RegressionAnalysisError::ZeroVariance {
                column: column.to_owned(),
            });
        }
    }

    let fit = LinearFit::fit(&x_values, &y_values)
        .map_err(|source| RegressionAnalysisError::Fit { source })?;
    let Some(covariance) = regression::covariance(&x_values, &y_values) else {
        let len = x_values.len();
        let source = RegressionError::TooFewObservations { len };
        return Err(RegressionAnalysisError::Fit { source });
    };
    let correlation = regression::pearson(&x_values, &y_values).unwrap_or(fit.r_value);

    tracing::info!(
        x,
        y,
        pairs = fit.len,
        slope = fit.slope,
        "fitted linear regression"
    );
    Ok(RegressionReport {
        x: x.to_owned(),
        y: y.to_owned(),
        x_values,
        y_values,
        covariance,
        correlation,
        fit,
    })
}

impl RegressionReport {
    /// Fitted line as `y=<slope>x+<intercept>` with two decimals.
    #[must_use]
    pub fn equation(&self) -> String {
        format_equation(self.fit.slope, self.fit.intercept)
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fit = &self.fit;
        let covariance = round2(self.covariance);
        let correlation = round2(self.correlation);
        writeln!(f, "Linear Regression ({} vs {})", self.y, self.x)?;
        writeln!(f, "--------------")?;
        writeln!(f, "Covariance:                {covariance:.2}")?;
        writeln!(f, "Correlation Coefficient:   {correlation:.2}")?;
        writeln!(f)?;
        writeln!(f, "y = {}·x + {}", fit.slope, fit.intercept)?;
        writeln!(f)?;
        writeln!(f, "r:                         {:.4}", fit.r_value)?;
        writeln!(f, "p-value:                   {:.4}", fit.p_value)?;
        writeln!(f, "Slope std. error:          {:.4}", fit.std_err)?;
        writeln!(
            f,
            "Intercept std. error:      {:.4}",
            fit.intercept_std_err
        )?;
        write!(f, "Pairs:                     {}", fit.len)
    }
}

/// `y=<slope>x+<intercept>` with two decimals, using `-` for a negative
/// intercept.
#[must_use]
pub fn format_equation(slope: f64, intercept: f64) -> String {
    if intercept < 0.0 {
        format!("y={slope:.2}x-{:.2}", -intercept)
    } else {
        format!("y={slope:.2}x+{intercept:.2}")
    }
}

/// Covariance and correlation recomputed by hand from rounded values.
///
/// Deviations from the rounded means are rounded to two decimals, so are
/// their products; the covariance is their sum over `n - 1`. The correlation
/// divides that covariance by the rounded standard deviations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepByStepCheck {
    pub covariance: f64,
    /// `None` when a rounded standard deviation is zero.
    pub correlation: Option<f64>,
    pub covariance_agrees: bool,
    pub correlation_agrees: bool,
}

impl StepByStepCheck {
    /// # Errors
    ///
    /// Fails when the report holds fewer than two pairs.
    #[expect(clippy::cast_precision_loss)]
    pub fn compute(report: &RegressionReport) -> Result<Self, RegressionAnalysisError> {
        let too_few = || RegressionAnalysisError::TooFewPairs {
            x: report.x.clone(),
            y: report.y.clone(),
            len: report.x_values.len(),
        };
        if report.x_values.len() < 2 {
            return Err(too_few());
        }
        let x_stats = StatsSummary::new(report.x_values.iter().copied())
            .map_err(|_| too_few())?;
        let y_stats = StatsSummary::new(report.y_values.iter().copied())
            .map_err(|_| too_few())?;

        let products = report
            .x_values
            .iter()
            .zip(&report.y_values)
            .map(|(x, y)| round2(round2(x - x_stats.mean) * round2(y - y_stats.mean)));
        let covariance = products.sum::<f64>() / (report.x_values.len() - 1) as f64;
        let correlation = x_stats
            .std_dev
            .zip(y_stats.std_dev)
            .map(|(sx, sy)| sx * sy)
            .filter(|denominator| *denominator != 0.0)
            .map(|denominator| covariance / denominator);

        let agrees =
            |a: f64, b: f64| (round2(a) - round2(b)).abs() <= STEP_BY_STEP_TOLERANCE + 1e-9;
        let check = Self {
            covariance,
            correlation,
            covariance_agrees: agrees(covariance, report.covariance),
            correlation_agrees: correlation.is_some_and(|r| agrees(r, report.correlation)),
        };
        if !check.covariance_agrees {
            tracing::warn!(
                by_hand = round2(covariance),
                library = round2(report.covariance),
                "step-by-step covariance differs from library value"
            );
        }
        if !check.correlation_agrees {
            tracing::warn!(
                by_hand = ?correlation.map(round2),
                library = round2(report.correlation),
                "step-by-step correlation differs from library value"
            );
        }
        Ok(check)
    }
}

impl fmt::Display for StepByStepCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let covariance = round2(self.covariance);
        writeln!(f, "Covariance calculated:                {covariance:.2}")?;
        match self.correlation {
            Some(r) => write!(f, "Correlation Coefficient calculated:   {:.2}", round2(r)),
            None => write!(f, "Correlation Coefficient calculated:   undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    fn table(rows: &[(&str, &str)]) -> ObservationTable {
        ObservationTable::from_rows(["x", "y"], rows.iter().map(|(x, y)| vec![*x, *y]))
    }

    #[test]
    fn test_perfectly_correlated_columns() {
        let table = table(&[("1", "2"), ("2", "4"), ("3", "6"), ("4", "8")]);
        let report = run(&table, "x", "y").unwrap();
        assert_close(report.fit.slope, 2.0, 1e-12);
        assert_close(report.fit.intercept, 0.0, 1e-12);
        assert_close(report.correlation, 1.0, 1e-12);
        assert_close(report.covariance, 10.0 / 3.0, 1e-12);
        assert_eq!(report.equation(), "y=2.00x+0.00");
    }

    #[test]
    fn test_incomplete_pairs_are_dropped() {
        let table = table(&[("1", "2"), ("NA", "3"), ("2", ""), ("3", "6"), ("5", "10")]);
        let report = run(&table, "x", "y").unwrap();
        assert_eq!(report.x_values, [1.0, 3.0, 5.0]);
        assert_eq!(report.fit.len, 3);
    }

    #[test]
    fn test_too_few_pairs() {
        let table = table(&[("1", "2"), ("NA", "3")]);
        let err = run(&table, "x", "y").unwrap_err();
        assert!(matches!(err, RegressionAnalysisError::TooFewPairs { len: 1, .. }));
    }

    #[test]
    fn test_zero_variance_is_an_error() {
        let err = run(&table(&[("1", "5"), ("2", "5"), ("3", "5")]), "x", "y").unwrap_err();
        let RegressionAnalysisError::ZeroVariance { column } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(column, "y");

        let err = run(&table(&[("1", "5"), ("1", "6")]), "x", "y").unwrap_err();
        let RegressionAnalysisError::ZeroVariance { column } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(column, "x");
    }

    #[test]
    fn test_missing_column() {
        let err = run(&table(&[("1", "2")]), "x", "z").unwrap_err();
        let RegressionAnalysisError::Table { source } = err else {
            panic!("unexpected error: {err}");
        };
        assert!(matches!(source, TableError::MissingColumn { .. }));
    }

    #[test]
    fn test_format_equation_signs() {
        assert_eq!(format_equation(0.6, 2.2), "y=0.60x+2.20");
        assert_eq!(format_equation(-2.0, -1.234), "y=-2.00x-1.23");
    }

    #[test]
    fn test_step_by_step_agrees_on_clean_data() {
        let table = table(&[("1", "2"), ("2", "4"), ("3", "5"), ("4", "4"), ("5", "5")]);
        let report = run(&table, "x", "y").unwrap();
        let check = StepByStepCheck::compute(&report).unwrap();
        // Means 3 and 4 are exact, so the hand computation is exact too
        assert_close(check.covariance, 1.5, 1e-12);
        assert!(check.covariance_agrees);
        assert!(check.correlation_agrees);
        assert_close(check.correlation.unwrap(), 0.77, 0.01);
    }

    #[test]
    fn test_report_display_mentions_values() {
        let table = table(&[("1", "2"), ("2", "4"), ("3", "6")]);
        let text = run(&table, "x", "y").unwrap().to_string();
        assert!(text.contains("Covariance:                2.00"));
        assert!(text.contains("Correlation Coefficient:   1.00"));
        assert!(text.contains("Pairs:                     3"));
    }
}
