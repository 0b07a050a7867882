//! Plain-text tables for the terminal

use std::io::{self, Write};

use tidystat_analysis::{
    export::MISSING_CELL,
    tidy::{TidyCell, TidyColumn, TidyTable},
};
use tidystat_stats::descriptive::round2;

fn format_number(value: Option<f64>) -> String {
    value.map_or_else(
        || MISSING_CELL.to_owned(),
        |v| format!("{:.2}", round2(v) + 0.0),
    )
}

/// Writes the tidy table with one column per header name. Text columns are
/// left-aligned and numbers right-aligned with two decimals.
pub(super) fn write_tidy_table<W>(mut writer: W, table: &TidyTable) -> io::Result<()>
where
    W: Write,
{
    let header = table.columns();
    let columns = header
        .iter()
        .filter_map(|name| table.resolve_column(name))
        .collect::<Vec<_>>();

    let cells = table
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|&column| match row.cell(column) {
                    TidyCell::Text(text) => text.to_owned(),
                    TidyCell::Number(value) => format_number(value),
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain([name.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let line = |writer: &mut W, fields: &[&str]| -> io::Result<()> {
        let mut text = String::new();
        for ((field, width), column) in fields.iter().zip(&widths).zip(&columns) {
            if !text.is_empty() {
                text.push_str("  ");
            }
            match column {
                TidyColumn::Group | TidyColumn::Stat => text.push_str(&format!("{field:<width$}")),
                TidyColumn::Variable(_) => text.push_str(&format!("{field:>width$}")),
            }
        }
        writeln!(writer, "{}", text.trim_end())
    };

    line(&mut writer, &header)?;
    let total_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    writeln!(writer, "{}", "-".repeat(total_width))?;
    for row in &cells {
        let fields = row.iter().map(String::as_str).collect::<Vec<_>>();
        line(&mut writer, &fields)?;
    }
    Ok(())
}
