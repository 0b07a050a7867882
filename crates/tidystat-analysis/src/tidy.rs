//! Wide "tidy" statistics table
//!
//! A [`TidyTable`] has one row per (group, statistic) pair and one column
//! per variable:
//!
//! ```text
//! Group | Stat   | Pre-D | Post-D | ...
//! 0     | mean   | 13.2  | 11.4   |
//! 0     | var    | 2.7   | 3.1    |
//! ...
//! ```
//!
//! It is built from [`GroupedStats`] by flattening every cell into long
//! records and pivoting them back to the wide layout. Rows are ordered by
//! first-seen group, then by [`Statistic::ALL`].

use std::collections::HashMap;

use tidystat_stats::descriptive::Statistic;

use crate::grouped::GroupedStats;

pub const GROUP_COLUMN: &str = "Group";
pub const STAT_COLUMN: &str = "Stat";

/// One `(group, statistic)` row.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRow {
    pub group: String,
    pub stat: Statistic,
    /// One value per variable, in [`TidyTable::variables`] order. `None`
    /// marks an undefined statistic or a missing (variable, group) cell.
    pub values: Vec<Option<f64>>,
}

/// Column selector resolved from a header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TidyColumn {
    Group,
    Stat,
    Variable(usize),
}

impl TidyRow {
    #[must_use]
    pub fn cell(&self, column: TidyColumn) -> TidyCell<'_> {
        match column {
            TidyColumn::Group => TidyCell::Text(&self.group),
            TidyColumn::Stat => TidyCell::Text(self.stat.label()),
            TidyColumn::Variable(index) => {
                TidyCell::Number(self.values.get(index).copied().flatten())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TidyCell<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

/// Long-format record produced while flattening.
struct LongRecord<'a> {
    variable: &'a str,
    group: &'a str,
    stat: Statistic,
    value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    variables: Vec<String>,
    rows: Vec<TidyRow>,
}

impl TidyTable {
    /// Reshapes grouped statistics into the wide layout.
    ///
    /// A (variable, group) combination missing from `stats` produces `None`
    /// cells rather than an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidystat_analysis::{grouped, table::ObservationTable, tidy::TidyTable};
    /// use tidystat_stats::descriptive::Statistic;
    ///
    /// let table = ObservationTable::from_rows(
    ///     ["G", "X"],
    ///     [vec!["A", "1"], vec!["A", "2"], vec!["B", "4"]],
    /// );
    /// let stats = grouped::aggregate(&table, "G", &["X"]).unwrap().stats;
    /// let tidy = TidyTable::from_grouped(&stats);
    ///
    /// assert_eq!(tidy.columns(), ["Group", "Stat", "X"]);
    /// assert_eq!(tidy.len(), 18);
    /// assert_eq!(tidy.cell("A", Statistic::Mean, "X"), Some(1.5));
    /// ```
    #[must_use]
    pub fn from_grouped(stats: &GroupedStats) -> Self {
        let records = stats
            .iter()
            .flat_map(|(variable, group, summary)| {
                summary.iter().map(move |(stat, value)| LongRecord {
                    variable,
                    group,
                    stat,
                    value,
                })
            })
            .collect::<Vec<_>>();
        Self::pivot(&records)
    }

    fn pivot(records: &[LongRecord<'_>]) -> Self {
        let mut variables: Vec<&str> = vec![];
        let mut groups: Vec<&str> = vec![];
        let mut cells = HashMap::new();
        for record in records {
            if !variables.contains(&record.variable) {
                variables.push(record.variable);
            }
            if !groups.contains(&record.group) {
                groups.push(record.group);
            }
            cells.insert((record.group, record.stat, record.variable), record.value);
        }

        let rows = groups
            .iter()
            .flat_map(|&group| {
                let cells = &cells;
                let variables = &variables;
                Statistic::ALL.into_iter().map(move |stat| TidyRow {
                    group: group.to_owned(),
                    stat,
                    values: variables
                        .iter()
                        .map(|&variable| cells.get(&(group, stat, variable)).copied().flatten())
                        .collect(),
                })
            })
            .collect();

        Self {
            variables: variables.into_iter().map(str::to_owned).collect(),
            rows,
        }
    }

    /// Header names: `Group`, `Stat`, then the variables.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        [GROUP_COLUMN, STAT_COLUMN]
            .into_iter()
            .chain(self.variables.iter().map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    #[must_use]
    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct groups in row order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = vec![];
        for row in &self.rows {
            if groups.last() != Some(&row.group.as_str()) {
                groups.push(&row.group);
            }
        }
        groups
    }

    #[must_use]
    pub fn resolve_column(&self, name: &str) -> Option<TidyColumn> {
        match name {
            GROUP_COLUMN => Some(TidyColumn::Group),
            STAT_COLUMN => Some(TidyColumn::Stat),
            _ => self
                .variables
                .iter()
                .position(|v| v == name)
                .map(TidyColumn::Variable),
        }
    }

    #[must_use]
    pub fn cell(&self, group: &str, stat: Statistic, variable: &str) -> Option<f64> {
        let index = self.variables.iter().position(|v| v == variable)?;
        self.rows
            .iter()
            .find(|row| row.group == group && row.stat == stat)?
            .values[index]
    }

    /// Values of one statistic of one variable, one per group in row order.
    ///
    /// Returns `None` when the variable is not a column of the table.
    #[must_use]
    pub fn series(&self, stat: Statistic, variable: &str) -> Option<Vec<Option<f64>>> {
        let index = self.variables.iter().position(|v| v == variable)?;
        Some(
            self.rows
                .iter()
                .filter(|row| row.stat == stat)
                .map(|row| row.values[index])
                .collect(),
        )
    }

    pub fn rows_for_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a TidyRow> + 'a {
        self.rows.iter().filter(move |row| row.group == group)
    }
}
