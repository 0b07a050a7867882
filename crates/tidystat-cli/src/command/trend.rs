use anyhow::Context as _;
use clap::Args;
use tidystat_stats::descriptive::Statistic;

use super::{Analysis, CommonArg};
use crate::figure::{Figure, FigureNumber, build};

#[derive(Default, Debug, Clone, Args)]
pub(crate) struct TrendArg {
    /// First variable (defaults to the first configured pair)
    a: Option<String>,

    /// Second variable (defaults to the first configured pair)
    b: Option<String>,

    /// Plot only this statistic for both variables (mean, var, std, min,
    /// Q1, Q2, Q3, max or "cv (%)")
    #[arg(long)]
    stat: Option<Statistic>,
}

pub(crate) fn run(common: &CommonArg, arg: &TrendArg) -> anyhow::Result<()> {
    let analysis = Analysis::load(common)?;
    let (a, b) = variables(&analysis, arg)?;
    let figures = trend_figures(
        &analysis,
        &a,
        &b,
        arg.stat,
        FigureNumber::new(analysis.config.start_fig),
    )?;
    common.present(&figures)
}

fn variables(analysis: &Analysis, arg: &TrendArg) -> anyhow::Result<(String, String)> {
    let default = analysis.config.plots.paired_vars.first();
    let a = arg
        .a
        .clone()
        .or_else(|| default.map(|(a, _)| a.clone()))
        .context("No variables given and no pairs configured")?;
    let b = arg
        .b
        .clone()
        .or_else(|| default.map(|(_, b)| b.clone()))
        .context("No second variable given and no pairs configured")?;
    Ok((a, b))
}

/// Quartile trends of both variables, their means, their differences and
/// their standard deviations; or only `stat` when one is given.
fn trend_figures(
    analysis: &Analysis,
    a: &str,
    b: &str,
    stat: Option<Statistic>,
    number: FigureNumber,
) -> anyhow::Result<Vec<Figure>> {
    let tidy = &analysis.tidy;
    let group_var = analysis.config.group_var.as_str();
    let pair = [a, b];

    if let Some(stat) = stat {
        let figure = build::statistic_trend(number, tidy, group_var, stat, &pair)?;
        return Ok(vec![figure]);
    }

    let mut number = number;
    let mut next = || {
        let current = number;
        number = number.next();
        current
    };
    let figures = vec![
        build::quartile_trends(next(), tidy, group_var, a)?,
        build::quartile_trends(next(), tidy, group_var, b)?,
        build::statistic_trend(next(), tidy, group_var, Statistic::Mean, &pair)?,
        build::difference_trends(next(), tidy, group_var, a, b)?,
        build::statistic_trend(next(), tidy, group_var, Statistic::StdDev, &pair)?,
    ];
    Ok(figures)
}
