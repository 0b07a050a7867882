use std::io;

use anyhow::Context as _;
use clap::Args;
use tidystat_analysis::export;

use super::{Analysis, CommonArg, regress, table};
use crate::{
    figure::{Figure, FigureNumber, build},
    util::Output,
};

#[derive(Default, Debug, Clone, Args)]
pub(crate) struct ReportArg {
    /// Plot variant: 1 draws a boxplot per pre/post pair, 2 draws the
    /// overview of all variables
    #[arg(allow_negative_numbers = true)]
    pub(super) which_plot: Option<i64>,
}

pub(crate) fn run(common: &CommonArg, arg: &ReportArg) -> anyhow::Result<()> {
    let analysis = Analysis::load(common)?;
    let config = &analysis.config;

    if config.check_df {
        table::write_tidy_table(io::stdout().lock(), &analysis.tidy)
            .context("Failed to print the statistics table")?;
        println!();
    }
    if config.check_dict {
        Output::stdout().write_json(&analysis.stats)?;
    }

    export_tables(&analysis)?;

    let mut number = FigureNumber::new(config.start_fig);
    let mut figures = vec![];
    if config.regression.enabled {
        let report = regress::print_regression(
            &analysis.table,
            &config.regression.x,
            &config.regression.y,
            config.regression.step_by_step,
        )?;
        figures.push(build::regression_scatter(number, &report));
        number = number.next();
    }

    match plot_variant(&analysis, arg.which_plot, number)? {
        Some(plots) => figures.extend(plots),
        None => println!("Nothing to plot."),
    }

    common.present(&figures)
}

fn export_tables(analysis: &Analysis) -> anyhow::Result<()> {
    let export = &analysis.config.export;
    if export.full_csv {
        export::export_full(&analysis.tidy, &export.full_csv_name)
            .context("Failed to export the statistics table")?;
        println!(
            "Exported statistics table to {}",
            export.full_csv_name.display()
        );
    }
    if export.groups_csv {
        let written = export::export_by_group(
            &analysis.tidy,
            &export.groups_csv_vars,
            &export.groups_dir,
            &export.groups_suffix,
            export.create_dir,
        )
        .context("Failed to export group statistics")?;
        println!(
            "Exported {} group files to {}",
            written.len(),
            export.groups_dir.display()
        );
    }
    Ok(())
}

/// Figures of plot variant `which`, numbered from `number`. `None` when the
/// variant draws nothing.
fn plot_variant(
    analysis: &Analysis,
    which: Option<i64>,
    mut number: FigureNumber,
) -> anyhow::Result<Option<Vec<Figure>>> {
    let Analysis {
        config,
        table,
        tidy,
        ..
    } = analysis;
    let plots = &config.plots;

    let figures = match which {
        Some(1) => {
            let mut figures = vec![];
            for (before, after) in &plots.paired_vars {
                let figure =
                    build::double_boxplot(number, table, tidy, &config.group_var, before, after)
                        .with_context(|| format!("Failed to plot {before} and {after}"))?;
                figures.push(figure);
                number = number.next();
            }
            figures
        }
        Some(2) => {
            let figure = build::overview_boxplot(
                number,
                table,
                tidy,
                &config.group_var,
                &plots.overview_vars,
                &plots.overview_reference_vars,
            )
            .context("Failed to plot the overview")?;
            vec![figure]
        }
        _ => return Ok(None),
    };
    Ok(Some(figures))
}
