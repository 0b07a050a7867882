use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tidystat_analysis::{
    config::AnalysisConfig,
    grouped::{self, GroupedStats},
    table::ObservationTable,
    tidy::TidyTable,
};

use crate::{
    figure::{Figure, snapshot},
    util, view,
};

use self::{
    regress::RegressArg, report::ReportArg, summary::SummaryArg, trend::TrendArg,
};

mod regress;
mod report;
mod summary;
mod table;
mod trend;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,

    #[clap(flatten)]
    common: CommonArg,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the full pipeline and draw the selected plot variant
    Report(#[clap(flatten)] ReportArg),
    /// Print or save the grouped statistics
    Summary(#[clap(flatten)] SummaryArg),
    /// Regress one column on another
    Regress(#[clap(flatten)] RegressArg),
    /// Plot statistics of two variables across groups
    Trend(#[clap(flatten)] TrendArg),
}

/// Options shared by every mode. Each one overrides the matching
/// configuration value.
#[derive(Default, Debug, Clone, Args)]
pub(crate) struct CommonArg {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input table (overrides `csv_name`)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Grouping column (overrides `group_var`)
    #[arg(long, global = true)]
    group_var: Option<String>,

    /// Variables to summarize, comma-separated (overrides `statistics_vars`)
    #[arg(long, global = true, value_delimiter = ',')]
    variables: Option<Vec<String>>,

    /// Number of the first figure (overrides `start_fig`)
    #[arg(long, global = true)]
    start_fig: Option<u32>,

    /// Write text snapshots of the figures into this directory
    #[arg(long, global = true)]
    figures_dir: Option<PathBuf>,

    /// Do not open the interactive figure viewer
    #[arg(long, global = true)]
    no_view: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

impl CommonArg {
    /// Configuration file (or defaults) with the command-line overrides
    /// applied.
    pub(crate) fn load_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("configuration", path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(input) = &self.input {
            config.csv_name.clone_from(input);
        }
        if let Some(group_var) = &self.group_var {
            config.group_var.clone_from(group_var);
        }
        if let Some(variables) = &self.variables {
            config.statistics_vars.clone_from(variables);
        }
        if let Some(start_fig) = self.start_fig {
            config.start_fig = start_fig;
        }
        Ok(config)
    }

    /// Writes snapshots and opens the viewer as requested.
    pub(crate) fn present(&self, figures: &[Figure]) -> anyhow::Result<()> {
        if figures.is_empty() {
            return Ok(());
        }
        if let Some(dir) = &self.figures_dir {
            let written = snapshot::write_snapshots(dir, figures)?;
            eprintln!("Wrote {} figures to {}", written.len(), dir.display());
        }
        if !self.no_view {
            view::show(figures)?;
        }
        Ok(())
    }
}

/// Loaded input and the statistics derived from it.
#[derive(Debug)]
pub(crate) struct Analysis {
    pub config: AnalysisConfig,
    pub table: ObservationTable,
    pub stats: GroupedStats,
    pub tidy: TidyTable,
}

impl Analysis {
    pub(crate) fn load(common: &CommonArg) -> anyhow::Result<Self> {
        let config = common.load_config()?;
        let delimiter = config
            .delimiter_byte()
            .with_context(|| format!("Delimiter is not ASCII: {:?}", config.delimiter))?;

        tracing::info!(path = %config.csv_name.display(), "loading input table");
        let table = util::read_table_file(&config.csv_name, delimiter)?;
        tracing::info!(
            records = table.len(),
            columns = table.columns().len(),
            "loaded input table"
        );

        let aggregation = grouped::aggregate(&table, &config.group_var, &config.statistics_vars)
            .context("Failed to compute group statistics")?;
        let tidy = TidyTable::from_grouped(&aggregation.stats);

        Ok(Self {
            config,
            table,
            stats: aggregation.stats,
            tidy,
        })
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    util::init_tracing(args.common.verbose);

    match args.mode.unwrap_or(Mode::Report(ReportArg::default())) {
        Mode::Report(arg) => report::run(&args.common, &arg)?,
        Mode::Summary(arg) => summary::run(&args.common, &arg)?,
        Mode::Regress(arg) => regress::run(&args.common, &arg)?,
        Mode::Trend(arg) => trend::run(&args.common, &arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory as _;
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_default_mode_is_report() {
        let args = CommandArgs::try_parse_from(["tidystat"]).unwrap();
        assert!(args.mode.is_none());

        let args = CommandArgs::try_parse_from(["tidystat", "report", "2", "--no-view"]).unwrap();
        let Some(Mode::Report(arg)) = args.mode else {
            panic!("expected the report mode");
        };
        assert_eq!(arg.which_plot, Some(2));
        assert!(args.common.no_view);
    }

    #[test]
    fn test_overrides_apply_on_top_of_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{ "group_var": "Act", "statistics_vars": ["A"], "start_fig": 4 }"#,
        )
        .unwrap();

        let args = CommandArgs::try_parse_from([
            "tidystat",
            "summary",
            "--config",
            config_path.to_str().unwrap(),
            "--variables",
            "X,Y",
            "--input",
            "survey.csv",
        ])
        .unwrap();
        let config = args.common.load_config().unwrap();
        assert_eq!(config.group_var, "Act");
        assert_eq!(config.statistics_vars, ["X", "Y"]);
        assert_eq!(config.csv_name, PathBuf::from("survey.csv"));
        assert_eq!(config.start_fig, 4);
    }

    #[test]
    fn test_analysis_load() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("dades.csv");
        fs::write(
            &input,
            "Mar,Pre-D,Post-D\n0,14,12\n1,16,10\n0,13,11\n1,15,9\n",
        )
        .unwrap();

        let common = CommonArg {
            input: Some(input),
            variables: Some(vec!["Pre-D".to_owned(), "Post-D".to_owned(), "Pre-T".to_owned()]),
            ..CommonArg::default()
        };
        let analysis = Analysis::load(&common).unwrap();
        assert_eq!(analysis.tidy.len(), 2 * 9);
        assert_eq!(analysis.tidy.variables(), ["Pre-D", "Post-D"]);
        assert_eq!(analysis.stats.get("Pre-D", "1").unwrap().mean, 15.5);
    }

    #[test]
    fn test_analysis_load_reports_missing_input() {
        let common = CommonArg {
            input: Some(PathBuf::from("/nonexistent/dades.csv")),
            ..CommonArg::default()
        };
        let err = Analysis::load(&common).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dades.csv"));
    }
}
