use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use tidystat_analysis::export;

use super::{Analysis, CommonArg, table};
use crate::util::Output;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Nested statistics as JSON
    Json,
    /// The tidy table as CSV
    Csv,
}

#[derive(Default, Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    #[arg(long, value_enum, default_value_t)]
    format: SummaryFormat,

    /// Output file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(common: &CommonArg, arg: &SummaryArg) -> anyhow::Result<()> {
    let analysis = Analysis::load(common)?;
    let mut output = Output::from_output_path(arg.output.clone())?;
    write_summary(&mut output, &analysis, arg.format)?;
    if let Output::File { path, .. } = &output {
        eprintln!("Wrote statistics to {}", path.display());
    }
    Ok(())
}

fn write_summary(
    output: &mut Output,
    analysis: &Analysis,
    format: SummaryFormat,
) -> anyhow::Result<()> {
    match format {
        SummaryFormat::Json => return output.write_json(&analysis.stats),
        SummaryFormat::Table => table::write_tidy_table(&mut *output, &analysis.tidy)?,
        SummaryFormat::Csv => {
            let tidy = &analysis.tidy;
            let header = tidy.columns();
            let columns = header
                .iter()
                .filter_map(|name| tidy.resolve_column(name))
                .collect::<Vec<_>>();
            export::write_csv(&mut *output, &header, &columns, tidy.rows())?;
        }
    }
    output
        .flush()
        .with_context(|| format!("Failed to write statistics to {}", output.display_path()))
}
