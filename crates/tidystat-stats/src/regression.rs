//! Simple linear regression and paired-sample moments.
//!
//! [`LinearFit::fit`] fits `y = slope * x + intercept` by ordinary least
//! squares and reports the correlation coefficient, the two-sided p-value of
//! the slope (Student's t with `n - 2` degrees of freedom) and the standard
//! errors of slope and intercept.

use crate::special::student_t_two_sided_p;

/// Keeps `1 - r^2` away from zero when the fit is perfect.
const TINY: f64 = 1.0e-20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RegressionError {
    #[display("x and y must have the same length (got {x_len} and {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[display("regression requires at least 2 observations (got {len})")]
    TooFewObservations { len: usize },
    #[display("x has zero variance")]
    ZeroVarianceX,
}

/// Result of an ordinary least squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Two-sided p-value for the null hypothesis `slope == 0`.
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_err: f64,
    pub intercept_std_err: f64,
    pub len: usize,
}

impl LinearFit {
    /// Fits a line through paired observations.
    ///
    /// ```
    /// # use tidystat_stats::regression::LinearFit;
    /// let fit = LinearFit::fit(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
    /// assert!((fit.slope - 2.0).abs() < 1e-12);
    /// assert!(fit.intercept.abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, RegressionError> {
        let moments = Moments::new(x, y)?;
        if moments.ss_xx == 0.0 {
            return Err(RegressionError::ZeroVarianceX);
        }

        let len = x.len();
        let n = len as f64;
        let slope = moments.ss_xy / moments.ss_xx;
        let intercept = moments.mean_y - slope * moments.mean_x;
        let r_value = if moments.ss_yy == 0.0 {
            0.0
        } else {
            (moments.ss_xy / (moments.ss_xx * moments.ss_yy).sqrt()).clamp(-1.0, 1.0)
        };

        let (p_value, std_err, intercept_std_err) = if len == 2 {
            // A line through two points always fits exactly.
            let p_value = if y[0] == y[1] { 1.0 } else { 0.0 };
            (p_value, 0.0, 0.0)
        } else {
            let df = n - 2.0;
            let t = r_value * (df / ((1.0 - r_value) * (1.0 + r_value) + TINY)).sqrt();
            let p_value = student_t_two_sided_p(t, df);
            let var_x = moments.ss_xx / n;
            let var_y = moments.ss_yy / n;
            let std_err = ((1.0 - r_value * r_value) * var_y / var_x / df).sqrt();
            let intercept_std_err = std_err * (var_x + moments.mean_x * moments.mean_x).sqrt();
            (p_value, std_err, intercept_std_err)
        };

        Ok(Self {
            slope,
            intercept,
            r_value,
            p_value,
            std_err,
            intercept_std_err,
            len,
        })
    }

    /// Predicted `y` for the given `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Sample covariance (`n - 1` denominator).
///
/// Returns `None` for mismatched lengths or fewer than two observations.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let moments = Moments::new(x, y).ok()?;
    Some(moments.ss_xy / (x.len() - 1) as f64)
}

/// Pearson correlation coefficient.
///
/// Returns `None` for mismatched lengths, fewer than two observations or a
/// sample with zero variance.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let moments = Moments::new(x, y).ok()?;
    if moments.ss_xx == 0.0 || moments.ss_yy == 0.0 {
        return None;
    }
    Some((moments.ss_xy / (moments.ss_xx * moments.ss_yy).sqrt()).clamp(-1.0, 1.0))
}

/// Means and centered sums of squares of a paired sample.
struct Moments {
    mean_x: f64,
    mean_y: f64,
    ss_xx: f64,
    ss_yy: f64,
    ss_xy: f64,
}

impl Moments {
    #[expect(clippy::cast_precision_loss)]
    fn new(x: &[f64], y: &[f64]) -> Result<Self, RegressionError> {
        if x.len() != y.len() {
            return Err(RegressionError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(RegressionError::TooFewObservations { len: x.len() });
        }

        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let (ss_xx, ss_yy, ss_xy) = x.iter().zip(y).fold(
            (0.0, 0.0, 0.0),
            |(ss_xx, ss_yy, ss_xy), (&xi, &yi)| {
                let dx = xi - mean_x;
                let dy = yi - mean_y;
                (ss_xx + dx * dx, ss_yy + dy * dy, ss_xy + dx * dy)
            },
        );
        Ok(Self {
            mean_x,
            mean_y,
            ss_xx,
            ss_yy,
            ss_xy,
        })
    }
}
