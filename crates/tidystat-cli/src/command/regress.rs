use anyhow::Context as _;
use clap::Args;
use tidystat_analysis::{
    regression::{self, RegressionReport, StepByStepCheck},
    table::ObservationTable,
};

use super::CommonArg;
use crate::{
    figure::{FigureNumber, build},
    util,
};

#[derive(Default, Debug, Clone, Args)]
pub(crate) struct RegressArg {
    /// Independent variable (defaults to `regression.x`)
    x: Option<String>,

    /// Dependent variable (defaults to `regression.y`)
    y: Option<String>,

    /// Recompute covariance and correlation from rounded values and compare
    #[arg(long)]
    step_by_step: bool,
}

pub(crate) fn run(common: &CommonArg, arg: &RegressArg) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let delimiter = config
        .delimiter_byte()
        .with_context(|| format!("Delimiter is not ASCII: {:?}", config.delimiter))?;
    let table = util::read_table_file(&config.csv_name, delimiter)?;

    let x = arg.x.as_deref().unwrap_or(&config.regression.x);
    let y = arg.y.as_deref().unwrap_or(&config.regression.y);
    let step_by_step = arg.step_by_step || config.regression.step_by_step;

    let report = print_regression(&table, x, y, step_by_step)?;
    let figure = build::regression_scatter(FigureNumber::new(config.start_fig), &report);
    common.present(&[figure])
}

/// Fits `y` on `x` and prints the report, followed by the hand-computed
/// check when `step_by_step` is set.
pub(super) fn print_regression(
    table: &ObservationTable,
    x: &str,
    y: &str,
    step_by_step: bool,
) -> anyhow::Result<RegressionReport> {
    let report = regression::run(table, x, y)
        .with_context(|| format!("Failed to regress '{y}' on '{x}'"))?;
    println!("{report}");

    if step_by_step {
        let check = StepByStepCheck::compute(&report)?;
        println!();
        println!("Step-by-step check");
        println!("------------------");
        println!("{check}");
        if !(check.covariance_agrees && check.correlation_agrees) {
            println!(
                "(differs from the library values by more than {:.2})",
                regression::STEP_BY_STEP_TOLERANCE
            );
        }
    }
    println!();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_regression_returns_report() {
        let table = ObservationTable::from_rows(
            ["Post-D", "Post-Son"],
            [
                vec!["1", "3"],
                vec!["2", "5"],
                vec!["3", "7"],
                vec!["", "1"],
            ],
        );
        let report = print_regression(&table, "Post-D", "Post-Son", true).unwrap();
        assert_eq!(report.x_values.len(), 3);
        assert_eq!(report.equation(), "y=2.00x+1.00");
    }

    #[test]
    fn test_print_regression_rejects_constant_column() {
        let table = ObservationTable::from_rows(["x", "y"], [vec!["1", "3"], vec!["1", "5"]]);
        let err = print_regression(&table, "x", "y", false).unwrap_err();
        assert!(format!("{err:#}").contains("zero variance"));
    }
}
