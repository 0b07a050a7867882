//! Observation table loaded from a delimited text file
//!
//! One record per subject, one column per measure. The table keeps the raw
//! cell text; numeric columns are parsed on demand so that a column that is
//! never requested cannot fail the run.
//!
//! # Missing Values
//!
//! Empty cells and the usual missing-value markers (`NA`, `N/A`, `NaN`,
//! `null`) parse as `None` and are skipped by the statistics.
//!
//! # Examples
//!
//! ```
//! use tidystat_analysis::table::ObservationTable;
//!
//! let csv = "Group,X\nA,1\nA,2\nB,NA\n";
//! let table = ObservationTable::from_reader(csv.as_bytes(), b',').unwrap();
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.distinct_labels("Group").unwrap(), ["A", "B"]);
//! assert_eq!(table.numeric_column("X").unwrap(), [Some(1.0), Some(2.0), None]);
//! ```

use std::io;

const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("failed to read delimited input: {source}")]
    Csv { source: csv::Error },
    #[display("column '{column}' not found in the input table")]
    MissingColumn { column: String },
    #[display("invalid number '{value}' in column '{column}' at data row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
}

/// Immutable table of raw observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationTable {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl ObservationTable {
    /// Reads a table with a header row from any reader.
    ///
    /// Fields are trimmed. Every record must have as many fields as the
    /// header.
    pub fn from_reader<R>(reader: R, delimiter: u8) -> Result<Self, TableError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = reader
            .headers()
            .map_err(|source| TableError::Csv { source })?
            .iter()
            .map(str::to_owned)
            .collect();
        let records = reader
            .records()
            .map(|record| {
                record
                    .map(|record| record.iter().map(str::to_owned).collect())
                    .map_err(|source| TableError::Csv { source })
            })
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(Self { columns, records })
    }

    /// Builds a table from in-memory rows.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have exactly one cell per column.
    #[must_use]
    pub fn from_rows<C, R, S>(columns: C, rows: R) -> Self
    where
        C: IntoIterator<Item = S>,
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        let records = rows
            .into_iter()
            .map(|row| {
                let row = row.into_iter().map(Into::into).collect::<Vec<String>>();
                assert_eq!(row.len(), columns.len(), "row width must match header");
                row
            })
            .collect();
        Self { columns, records }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of records (subjects).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    fn column_index(&self, column: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| TableError::MissingColumn {
                column: column.to_owned(),
            })
    }

    /// Raw text of every cell in a column, in record order.
    pub fn labels(&self, column: &str) -> Result<Vec<&str>, TableError> {
        let index = self.column_index(column)?;
        Ok(self
            .records
            .iter()
            .map(|record| record[index].as_str())
            .collect())
    }

    /// Distinct labels of a column in first-occurrence order.
    pub fn distinct_labels(&self, column: &str) -> Result<Vec<&str>, TableError> {
        let mut distinct = Vec::new();
        for label in self.labels(column)? {
            if !distinct.contains(&label) {
                distinct.push(label);
            }
        }
        Ok(distinct)
    }

    /// Parses a column as numbers, with `None` for missing cells.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>, TableError> {
        let index = self.column_index(column)?;
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let cell = &record[index];
                parse_cell(cell).ok_or_else(|| invalid(column, row, cell))
            })
            .collect()
    }

    /// Non-missing values of `value_column` on records whose `group_column`
    /// equals `group`.
    pub fn group_values(
        &self,
        group_column: &str,
        value_column: &str,
        group: &str,
    ) -> Result<Vec<f64>, TableError> {
        let labels = self.labels(group_column)?;
        let values = self.numeric_column(value_column)?;
        Ok(labels
            .into_iter()
            .zip(values)
            .filter(|(label, _)| *label == group)
            .filter_map(|(_, value)| value)
            .collect())
    }

    /// Pairs of values from two columns, keeping only records where both
    /// are present.
    pub fn paired_values(
        &self,
        x_column: &str,
        y_column: &str,
    ) -> Result<(Vec<f64>, Vec<f64>), TableError> {
        let xs = self.numeric_column(x_column)?;
        let ys = self.numeric_column(y_column)?;
        Ok(xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| x.zip(y))
            .unzip())
    }
}

/// `Some(None)` for a missing marker, `Some(Some(v))` for a number and
/// `None` for anything else.
fn parse_cell(cell: &str) -> Option<Option<f64>> {
    if MISSING_MARKERS.contains(&cell) {
        return Some(None);
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
}

fn invalid(column: &str, row: usize, value: &str) -> TableError {
    TableError::InvalidNumber {
        column: column.to_owned(),
        row: row + 1,
        value: value.to_owned(),
    }
}
