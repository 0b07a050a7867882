//! Statistical building blocks for the tidystat project.
//!
//! This crate provides the numeric side of the analysis, free of any table
//! or file handling:
//!
//! - **Descriptive statistics**: the nine-field [`StatsSummary`](descriptive::StatsSummary)
//!   (mean, sample variance/std, quartiles, min/max, coefficient of variation)
//! - **Percentiles**: linear-interpolation percentiles over sorted samples
//! - **Box plots**: quartiles, Tukey whiskers and outliers for drawing boxes
//! - **Regression**: ordinary least squares with correlation, p-value and
//!   standard errors, plus sample covariance and Pearson correlation
//!
//! # Modules
//!
//! - [`descriptive`]: Summary statistics of one sample
//! - [`percentiles`]: Linear-interpolation percentiles
//! - [`boxplot`]: Box-and-whisker statistics
//! - [`regression`]: Simple linear regression
//! - [`special`]: Special functions used by the regression p-value
//!
//! # Examples
//!
//! ## Summarizing a sample
//!
//! ```
//! use tidystat_stats::descriptive::{Statistic, StatsSummary};
//!
//! let stats = StatsSummary::new([1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(stats.get(Statistic::Q1), Some(1.75));
//! assert_eq!(stats.get(Statistic::Variance), Some(1.67));
//! ```
//!
//! ## Fitting a line
//!
//! ```
//! use tidystat_stats::regression::LinearFit;
//!
//! let fit = LinearFit::fit(&[1.0, 2.0, 3.0, 4.0], &[3.0, 5.0, 7.0, 9.0]).unwrap();
//! assert!((fit.slope - 2.0).abs() < 1e-12);
//! assert!((fit.intercept - 1.0).abs() < 1e-12);
//! ```

pub mod boxplot;
pub mod descriptive;
pub mod percentiles;
pub mod regression;
pub mod special;
