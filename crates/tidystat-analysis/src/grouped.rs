//! Group-wise summary statistics
//!
//! [`aggregate`] partitions the observation table by the grouping column and
//! summarizes each requested variable within each group. The result is a
//! [`GroupedStats`]: variable → group → [`StatsSummary`].
//!
//! # Ordering
//!
//! Variables appear in the requested order; groups appear in the order their
//! label first occurs in the table. Both orders are preserved by every
//! downstream table, export and figure.
//!
//! # Missing Variables
//!
//! A requested variable that is not a column of the table is reported with a
//! warning and listed in [`Aggregation::skipped`]; the remaining variables
//! are still processed.

use serde::ser::{Serialize, SerializeMap as _, Serializer};
use tidystat_stats::descriptive::{Statistic, StatsSummary};

use crate::table::{ObservationTable, TableError};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AggregateError {
    #[display("grouping column '{column}' not found in the input table")]
    MissingGroupColumn { column: String },
    #[display("group '{group}' has no values for variable '{variable}'")]
    EmptyGroup { variable: String, group: String },
    #[display("{source}")]
    Table { source: TableError },
}

/// Summaries of one variable, one per group.
#[derive(Debug, Clone, PartialEq)]
struct VariableStats {
    name: String,
    groups: Vec<(String, StatsSummary)>,
}

/// Nested variable → group → summary lookup, insertion ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedStats {
    variables: Vec<VariableStats>,
}

impl GroupedStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the summary of one (variable, group) cell, replacing any
    /// previous summary of the same cell.
    pub fn insert(&mut self, variable: &str, group: &str, summary: StatsSummary) {
        let index = match self.variables.iter().position(|v| v.name == variable) {
            Some(index) => index,
            None => {
                self.variables.push(VariableStats {
                    name: variable.to_owned(),
                    groups: vec![],
                });
                self.variables.len() - 1
            }
        };
        let groups = &mut self.variables[index].groups;
        match groups.iter_mut().find(|(g, _)| g == group) {
            Some((_, existing)) => *existing = summary,
            None => groups.push((group.to_owned(), summary)),
        }
    }

    #[must_use]
    pub fn get(&self, variable: &str, group: &str) -> Option<&StatsSummary> {
        self.variables
            .iter()
            .find(|v| v.name == variable)?
            .groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, summary)| summary)
    }

    /// Shortcut for `get(variable, group)?.get(stat)`.
    #[must_use]
    pub fn value(&self, variable: &str, group: &str, stat: Statistic) -> Option<f64> {
        self.get(variable, group)?.get(stat)
    }

    #[must_use]
    pub fn contains_variable(&self, variable: &str) -> bool {
        self.variables.iter().any(|v| v.name == variable)
    }

    /// Variable names in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Group labels of one variable in insertion order.
    pub fn groups<'a>(&'a self, variable: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.variables
            .iter()
            .find(|v| v.name == variable)
            .into_iter()
            .flat_map(|v| v.groups.iter().map(|(g, _)| g.as_str()))
    }

    /// Every `(variable, group, summary)` cell, variable-major.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &StatsSummary)> + '_ {
        self.variables.iter().flat_map(|v| {
            v.groups
                .iter()
                .map(|(group, summary)| (v.name.as_str(), group.as_str(), summary))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Serializes as `{ variable: { group: { "mean": .., "var": .., .. } } }`
/// with undefined statistics as `null`.
impl Serialize for GroupedStats {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.variables.len()))?;
        for variable in &self.variables {
            map.serialize_entry(&variable.name, &GroupsRef(&variable.groups))?;
        }
        map.end()
    }
}

struct GroupsRef<'a>(&'a [(String, StatsSummary)]);

impl Serialize for GroupsRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (group, summary) in self.0 {
            map.serialize_entry(group, &SummaryRef(summary))?;
        }
        map.end()
    }
}

struct SummaryRef<'a>(&'a StatsSummary);

impl Serialize for SummaryRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Statistic::ALL.len()))?;
        for (stat, value) in self.0.iter() {
            map.serialize_entry(stat.label(), &value)?;
        }
        map.end()
    }
}

/// Outcome of [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub stats: GroupedStats,
    /// Requested variables that were not columns of the table.
    pub skipped: Vec<String>,
}

/// Summarizes `variables` within each group of `group_var`.
///
/// # Errors
///
/// Fails when the grouping column is missing, when a requested column holds
/// a non-numeric cell, or when a group has no values for a variable.
///
/// # Examples
///
/// ```
/// use tidystat_analysis::{grouped, table::ObservationTable};
///
/// let table = ObservationTable::from_rows(
///     ["Group", "X"],
///     [vec!["A", "1"], vec!["A", "3"], vec!["B", "5"]],
/// );
/// let aggregation = grouped::aggregate(&table, "Group", &["X", "Y"]).unwrap();
///
/// assert_eq!(aggregation.stats.get("X", "A").unwrap().mean, 2.0);
/// assert_eq!(aggregation.skipped, ["Y"]);
/// ```
pub fn aggregate<S>(
    table: &ObservationTable,
    group_var: &str,
    variables: &[S],
) -> Result<Aggregation, AggregateError>
where
    S: AsRef<str>,
{
    let labels = table
        .labels(group_var)
        .map_err(|_| AggregateError::MissingGroupColumn {
            column: group_var.to_owned(),
        })?;
    let groups = table
        .distinct_labels(group_var)
        .map_err(|source| AggregateError::Table { source })?;

    let mut stats = GroupedStats::new();
    let mut skipped = vec![];
    for variable in variables.iter().map(AsRef::as_ref) {
        if !table.has_column(variable) {
            if !skipped.iter().any(|s| s == variable) {
                tracing::warn!(variable, "variable not in the input table, skipping");
                skipped.push(variable.to_owned());
            }
            continue;
        }
        if stats.contains_variable(variable) {
            continue;
        }

        let values = table
            .numeric_column(variable)
            .map_err(|source| AggregateError::Table { source })?;
        for &group in &groups {
            let group_values = labels
                .iter()
                .zip(&values)
                .filter(|(label, _)| **label == group)
                .filter_map(|(_, value)| *value);
            let Ok(summary) = StatsSummary::new(group_values) else {
                return Err(AggregateError::EmptyGroup {
                    variable: variable.to_owned(),
                    group: group.to_owned(),
                });
            };
            if summary.cv_percent.is_none() {
                tracing::warn!(variable, group, "coefficient of variation is undefined");
            }
            tracing::debug!(variable, group, mean = summary.mean, "summarized group");
            stats.insert(variable, group, summary);
        }
    }

    tracing::info!(
        variables = stats.variables().count(),
        groups = groups.len(),
        skipped = skipped.len(),
        "aggregated group statistics"
    );
    Ok(Aggregation { stats, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_table() -> ObservationTable {
        ObservationTable::from_rows(
            ["Group", "X"],
            [
                vec!["A", "1"],
                vec!["B", "5"],
                vec!["A", "2"],
                vec!["B", "6"],
                vec!["A", "3"],
                vec!["B", "7"],
                vec!["A", "4"],
                vec!["B", "8"],
            ],
        )
    }

    #[test]
    fn test_scenario_values() {
        let aggregation = aggregate(&scenario_table(), "Group", &["X"]).unwrap();
        let a = aggregation.stats.get("X", "A").unwrap();
        assert_eq!(a.mean, 2.5);
        assert_eq!(a.min, 1.0);
        assert_eq!(a.max, 4.0);
        assert_eq!(a.q1, 1.75);
        assert_eq!(a.q2, 2.5);
        assert_eq!(a.q3, 3.25);
        assert_eq!(a.variance, Some(1.67));
        assert_eq!(a.std_dev, Some(1.29));
        assert_eq!(a.cv_percent, Some(51.64));

        let b = aggregation.stats.get("X", "B").unwrap();
        assert_eq!(b.mean, 6.5);
        assert_eq!(b.q1, 5.75);
        assert_eq!(b.cv_percent, Some(19.86));
        assert!(aggregation.skipped.is_empty());
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let table = ObservationTable::from_rows(
            ["G", "X"],
            [
                vec!["2", "1"],
                vec!["0", "1"],
                vec!["1", "1"],
                vec!["0", "2"],
            ],
        );
        let stats = aggregate(&table, "G", &["X"]).unwrap().stats;
        let groups = stats.groups("X").collect::<Vec<_>>();
        assert_eq!(groups, ["2", "0", "1"]);
    }

    #[test]
    fn test_variable_order_follows_request() {
        let table = ObservationTable::from_rows(
            ["G", "A", "B"],
            [vec!["x", "1", "2"], vec!["x", "3", "4"]],
        );
        let aggregation = aggregate(&table, "G", &["B", "A", "B"]).unwrap();
        let variables = aggregation.stats.variables().collect::<Vec<_>>();
        assert_eq!(variables, ["B", "A"]);
    }

    #[test]
    fn test_missing_variable_is_skipped() {
        let aggregation = aggregate(&scenario_table(), "Group", &["Y", "X"]).unwrap();
        assert_eq!(aggregation.skipped, ["Y"]);
        assert!(!aggregation.stats.contains_variable("Y"));
        assert_eq!(aggregation.stats.variables().collect::<Vec<_>>(), ["X"]);
    }

    #[test]
    fn test_missing_variable_requested_twice_is_skipped_once() {
        let aggregation = aggregate(&scenario_table(), "Group", &["Y", "X", "Y"]).unwrap();
        assert_eq!(aggregation.skipped, ["Y"]);
        assert_eq!(aggregation.stats.variables().collect::<Vec<_>>(), ["X"]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let table = scenario_table();
        let first = aggregate(&table, "Group", &["X"]).unwrap();
        let second = aggregate(&table, "Group", &["X"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_group_column() {
        let err = aggregate(&scenario_table(), "Mar", &["X"]).unwrap_err();
        let AggregateError::MissingGroupColumn { column } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(column, "Mar");
    }

    #[test]
    fn test_empty_group_is_an_error() {
        let table = ObservationTable::from_rows(
            ["G", "X"],
            [vec!["A", "1"], vec!["B", "NA"], vec!["A", "2"]],
        );
        let err = aggregate(&table, "G", &["X"]).unwrap_err();
        let AggregateError::EmptyGroup { variable, group } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!((variable.as_str(), group.as_str()), ("X", "B"));
        assert_eq!(err.to_string(), "group 'B' has no values for variable 'X'");
    }

    #[test]
    fn test_non_numeric_cell_is_an_error() {
        let table = ObservationTable::from_rows(["G", "X"], [vec!["A", "x"]]);
        let err = aggregate(&table, "G", &["X"]).unwrap_err();
        let AggregateError::Table { source } = err else {
            panic!("unexpected error: {err}");
        };
        assert!(matches!(source, TableError::InvalidNumber { .. }));
    }

    #[test]
    fn test_zero_mean_has_undefined_cv() {
        let table = ObservationTable::from_rows(["G", "X"], [vec!["A", "-1"], vec!["A", "1"]]);
        let stats = aggregate(&table, "G", &["X"]).unwrap().stats;
        assert_eq!(stats.value("X", "A", Statistic::Mean), Some(0.0));
        assert_eq!(stats.value("X", "A", Statistic::CvPercent), None);
    }

    #[test]
    fn test_insert_replaces_existing_cell() {
        let mut stats = GroupedStats::new();
        stats.insert("X", "A", StatsSummary::new([1.0]).unwrap());
        stats.insert("X", "A", StatsSummary::new([2.0]).unwrap());
        assert_eq!(stats.iter().count(), 1);
        assert_eq!(stats.value("X", "A", Statistic::Mean), Some(2.0));
    }

    #[test]
    fn test_serialize_nested_json() {
        let table = ObservationTable::from_rows(["G", "X"], [vec!["A", "3"]]);
        let aggregation = aggregate(&table, "G", &["X"]).unwrap();
        let json = serde_json::to_value(&aggregation.stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "X": {
                    "A": {
                        "mean": 3.0,
                        "var": null,
                        "std": null,
                        "min": 3.0,
                        "Q1": 3.0,
                        "Q2": 3.0,
                        "Q3": 3.0,
                        "max": 3.0,
                        "cv (%)": null
                    }
                }
            })
        );
    }
}
