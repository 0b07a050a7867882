//! Grouped survey statistics: loading, aggregation, reshaping and export
//!
//! This crate turns an observation table (one record per subject, a group
//! column and numeric measures) into per-group summary statistics and the
//! artifacts derived from them.
//!
//! # Pipeline
//!
//! 1. **Load** ([`table::ObservationTable`]): read the delimited input file
//! 2. **Aggregate** ([`grouped::aggregate`]): summarize every requested
//!    variable within every group into [`grouped::GroupedStats`]
//! 3. **Reshape** ([`tidy::TidyTable`]): pivot the nested statistics into one
//!    row per (group, statistic) and one column per variable
//! 4. **Export** ([`export`]): write the tidy table, whole or split by group,
//!    as CSV
//! 5. **Regress** ([`regression::run`]): fit a line between two columns of the
//!    observation table
//!
//! Every step is driven by an explicit [`config::AnalysisConfig`].
//!
//! # Example
//!
//! ```
//! use tidystat_analysis::{grouped, table::ObservationTable, tidy::TidyTable};
//! use tidystat_stats::descriptive::Statistic;
//!
//! let csv = "Group,X\nA,1\nA,2\nA,3\nA,4\nB,5\nB,6\nB,7\nB,8\n";
//! let table = ObservationTable::from_reader(csv.as_bytes(), b',').unwrap();
//!
//! let aggregation = grouped::aggregate(&table, "Group", &["X"]).unwrap();
//! let tidy = TidyTable::from_grouped(&aggregation.stats);
//!
//! assert_eq!(tidy.len(), 2 * 9);
//! assert_eq!(tidy.cell("A", Statistic::Q1, "X"), Some(1.75));
//! assert_eq!(tidy.cell("B", Statistic::CvPercent, "X"), Some(19.86));
//! ```

pub mod config;
pub mod export;
pub mod grouped;
pub mod regression;
pub mod table;
pub mod tidy;
