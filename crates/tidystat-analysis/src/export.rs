//! CSV export of the tidy statistics table
//!
//! Cells are written with at most two decimals in their shortest form
//! (`2.5`, `1.67`, `4`); undefined values are written as [`MISSING_CELL`].

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tidystat_stats::descriptive::round2;

use crate::tidy::{TidyCell, TidyColumn, TidyRow, TidyTable};

/// Text written for an undefined value.
pub const MISSING_CELL: &str = "NA";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ExportError {
    #[display("destination directory does not exist: {}", path.display())]
    MissingDirectory { path: PathBuf },
    #[display("column '{column}' is not in the statistics table")]
    UnknownColumn { column: String },
    #[display("failed to write {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to write CSV to {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// Writes one CSV per group, keeping only `columns`.
///
/// Files are named `<group>_<suffix>.csv` inside `dir` and written in group
/// order. Every column name is checked before the first file is created.
/// When `dir` does not exist it is created if `create_dir` is set, otherwise
/// the export fails with [`ExportError::MissingDirectory`].
///
/// Returns the written paths.
pub fn export_by_group<S>(
    table: &TidyTable,
    columns: &[S],
    dir: &Path,
    suffix: &str,
    create_dir: bool,
) -> Result<Vec<PathBuf>, ExportError>
where
    S: AsRef<str>,
{
    let selected = resolve_columns(table, columns)?;
    let header = columns.iter().map(AsRef::as_ref).collect::<Vec<_>>();

    if !dir.is_dir() {
        if !create_dir {
            return Err(ExportError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %dir.display(), "created export directory");
    }

    let mut written = vec![];
    for group in table.groups() {
        let path = dir.join(format!("{}_{suffix}.csv", file_stem(group)));
        write_csv_file(&path, &header, &selected, table.rows_for_group(group))?;
        tracing::info!(group, path = %path.display(), "exported group statistics");
        written.push(path);
    }
    Ok(written)
}

/// Writes the whole table, every column, to `path`.
pub fn export_full(table: &TidyTable, path: &Path) -> Result<(), ExportError> {
    let header = table.columns();
    let selected = resolve_columns(table, &header)?;
    write_csv_file(path, &header, &selected, table.rows().iter())?;
    tracing::info!(path = %path.display(), rows = table.len(), "exported statistics table");
    Ok(())
}

/// Writes `rows` projected to `columns` as CSV into any writer.
pub fn write_csv<'a, W, I>(
    writer: W,
    header: &[&str],
    columns: &[TidyColumn],
    rows: I,
) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a TidyRow>,
{
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(columns.iter().map(|&column| format_cell(row.cell(column))))?;
    }
    writer.flush()?;
    Ok(())
}

/// Shortest text of `value` rounded to two decimals. A value rounding to
/// zero from below is written as `0`.
#[must_use]
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(
        || MISSING_CELL.to_owned(),
        |v| (round2(v) + 0.0).to_string(),
    )
}

fn format_cell(cell: TidyCell<'_>) -> String {
    match cell {
        TidyCell::Text(text) => text.to_owned(),
        TidyCell::Number(value) => format_value(value),
    }
}

fn resolve_columns<S>(table: &TidyTable, columns: &[S]) -> Result<Vec<TidyColumn>, ExportError>
where
    S: AsRef<str>,
{
    columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            table
                .resolve_column(name)
                .ok_or_else(|| ExportError::UnknownColumn {
                    column: name.to_owned(),
                })
        })
        .collect()
}

fn write_csv_file<'a, I>(
    path: &Path,
    header: &[&str],
    columns: &[TidyColumn],
    rows: I,
) -> Result<(), ExportError>
where
    I: IntoIterator<Item = &'a TidyRow>,
{
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(BufWriter::new(file), header, columns, rows).map_err(|source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Group label usable as a file name component.
fn file_stem(group: &str) -> String {
    group
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{grouped, table::ObservationTable};

    fn tidy_table() -> TidyTable {
        let table = ObservationTable::from_rows(
            ["Group", "X", "Y"],
            [
                vec!["A", "1", "0"],
                vec!["A", "2", "0"],
                vec!["A", "3", "0"],
                vec!["A", "4", "0"],
                vec!["B", "5", "1"],
                vec!["B", "6", "2"],
                vec!["B", "7", "3"],
                vec!["B", "8", "4"],
            ],
        );
        let stats = grouped::aggregate(&table, "Group", &["X", "Y"])
            .unwrap()
            .stats;
        TidyTable::from_grouped(&stats)
    }

    fn read_records(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let mut records = vec![headers.iter().map(str::to_owned).collect()];
        for record in reader.records() {
            records.push(record.unwrap().iter().map(str::to_owned).collect());
        }
        records
    }

    #[test]
    fn test_export_by_group_writes_one_file_per_group() {
        let dir = TempDir::new().unwrap();
        let tidy = tidy_table();
        let written = export_by_group(&tidy, &["Stat", "X"], dir.path(), "X_only", false)
            .unwrap();

        let expected = ["A_X_only.csv", "B_X_only.csv"].map(|name| dir.path().join(name));
        assert_eq!(written, expected);
        for path in &written {
            let records = read_records(path);
            assert_eq!(records.len(), 1 + 9);
            assert!(records.iter().all(|r| r.len() == 2));
            assert_eq!(records[0], ["Stat", "X"]);
        }

        let a = read_records(&written[0]);
        assert_eq!(a[1], ["mean", "2.5"]);
        assert_eq!(a[2], ["var", "1.67"]);
        assert_eq!(a[4], ["min", "1"]);
        assert_eq!(a[9], ["cv (%)", "51.64"]);
    }

    #[test]
    fn test_undefined_cells_are_written_as_na() {
        let dir = TempDir::new().unwrap();
        let tidy = tidy_table();
        let written = export_by_group(&tidy, &["Stat", "Y"], dir.path(), "Y", false).unwrap();
        let a = read_records(&written[0]);
        // Group A has Y = 0 everywhere: zero mean
        assert_eq!(a[1], ["mean", "0"]);
        assert_eq!(a[9], ["cv (%)", "NA"]);
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let tidy = tidy_table();
        let missing = dir.path().join("exported_csvs");
        let err = export_by_group(&tidy, &["Stat", "X"], &missing, "s", false).unwrap_err();
        assert!(matches!(err, ExportError::MissingDirectory { ref path } if *path == missing));
        assert!(err.to_string().contains("exported_csvs"));
    }

    #[test]
    fn test_missing_directory_is_created_on_request() {
        let dir = TempDir::new().unwrap();
        let tidy = tidy_table();
        let nested = dir.path().join("out").join("groups");
        let written = export_by_group(&tidy, &["Stat", "X"], &nested, "s", true).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_unknown_column_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let tidy = tidy_table();
        let err = export_by_group(&tidy, &["Stat", "Z"], dir.path(), "s", false).unwrap_err();
        assert!(matches!(err, ExportError::UnknownColumn { ref column } if column == "Z"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_full() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("full.csv");
        export_full(&tidy_table(), &path).unwrap();

        let records = read_records(&path);
        assert_eq!(records.len(), 1 + 18);
        assert_eq!(records[0], ["Group", "Stat", "X", "Y"]);
        assert_eq!(records[10], ["B", "mean", "6.5", "2.5"]);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(2.5)), "2.5");
        assert_eq!(format_value(Some(4.0)), "4");
        assert_eq!(format_value(Some(1.666)), "1.67");
        assert_eq!(format_value(None), "NA");
    }

    #[test]
    fn test_format_value_has_no_negative_zero() {
        assert_eq!(format_value(Some(-0.001)), "0");
        assert_eq!(format_value(Some(-0.0)), "0");
        assert_eq!(format_value(Some(-0.006)), "-0.01");
    }

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!(file_stem("a/b"), "a_b");
        assert_eq!(file_stem("0"), "0");
    }
}
