//! Figure builders
//!
//! Every builder only selects and reshapes values that were already
//! computed: summary statistics come from the [`TidyTable`], raw values for
//! the boxes come from the [`ObservationTable`].

use ratatui::style::Color;
use tidystat_analysis::{
    regression::RegressionReport,
    table::{ObservationTable, TableError},
    tidy::TidyTable,
};
use tidystat_stats::{boxplot::BoxStats, descriptive::Statistic};

use super::{
    BoxPlot, BoxSeries, Figure, FigureNumber, FittedLine, LinePlot, LineSeries, MarkerSeries,
    ScatterPlot,
};

/// Statistics drawn by the quartile and difference trends, top to bottom.
const TREND_STATISTICS: [(Statistic, Color); 4] = [
    (Statistic::Q3, Color::Yellow),
    (Statistic::Mean, Color::Red),
    (Statistic::Q2, Color::Blue),
    (Statistic::Q1, Color::Green),
];

const SERIES_COLORS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

const GROUP_COLORS: [Color; 4] = [
    Color::LightBlue,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightYellow,
];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum FigureError {
    #[display("variable '{variable}' is not in the statistics table")]
    UnknownVariable { variable: String },
    #[display("{source}")]
    Table { source: TableError },
}

impl From<TableError> for FigureError {
    fn from(source: TableError) -> Self {
        Self::Table { source }
    }
}

fn stat_series(
    tidy: &TidyTable,
    stat: Statistic,
    variable: &str,
) -> Result<Vec<Option<f64>>, FigureError> {
    tidy.series(stat, variable)
        .ok_or_else(|| FigureError::UnknownVariable {
            variable: variable.to_owned(),
        })
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_owned()).collect()
}

fn cycle(colors: &[Color], index: usize) -> Color {
    colors[index % colors.len()]
}

/// Boxes of two variables side by side for every group, with their group
/// means joined by dashed lines.
pub fn double_boxplot(
    number: FigureNumber,
    table: &ObservationTable,
    tidy: &TidyTable,
    group_var: &str,
    var_a: &str,
    var_b: &str,
) -> Result<Figure, FigureError> {
    let groups = tidy.groups();
    let mut series = vec![];
    let mut markers = vec![];
    for (index, (variable, color)) in [(var_a, Color::Red), (var_b, Color::Green)]
        .into_iter()
        .enumerate()
    {
        let boxes = groups
            .iter()
            .map(|group| Ok(BoxStats::new(table.group_values(group_var, variable, group)?)))
            .collect::<Result<Vec<_>, TableError>>()?;
        series.push(BoxSeries {
            label: variable.to_owned(),
            color,
            boxes,
        });
        markers.push(MarkerSeries {
            label: format!("mean {variable}"),
            color,
            series_index: index,
            values: stat_series(tidy, Statistic::Mean, variable)?,
            connect: true,
        });
    }

    Ok(Figure {
        number,
        title: format!("Boxplots {var_a} and {var_b}"),
        x_title: group_var.to_owned(),
        y_title: "Value".to_owned(),
        body: BoxPlot {
            categories: owned(&groups),
            series,
            markers,
        }
        .into(),
    })
}

/// One slot per variable with one box per group. The markers are the first
/// group's means of `reference_vars`, matched to `variables` by position.
pub fn overview_boxplot<S>(
    number: FigureNumber,
    table: &ObservationTable,
    tidy: &TidyTable,
    group_var: &str,
    variables: &[S],
    reference_vars: &[S],
) -> Result<Figure, FigureError>
where
    S: AsRef<str>,
{
    let groups = tidy.groups();
    let series = groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let boxes = variables
                .iter()
                .map(|variable| {
                    Ok(BoxStats::new(table.group_values(group_var, variable.as_ref(), group)?))
                })
                .collect::<Result<Vec<_>, TableError>>()?;
            Ok(BoxSeries {
                label: format!("{group_var} = {group}"),
                color: cycle(&GROUP_COLORS, index),
                boxes,
            })
        })
        .collect::<Result<Vec<_>, FigureError>>()?;

    let mut markers = vec![];
    if let Some(first) = groups.first() {
        let values = reference_vars
            .iter()
            .take(variables.len())
            .map(|variable| {
                let variable = variable.as_ref();
                stat_series(tidy, Statistic::Mean, variable)
                    .map(|_| tidy.cell(first, Statistic::Mean, variable))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !values.is_empty() {
            markers.push(MarkerSeries {
                label: format!("reference mean ({group_var} = {first})"),
                color: Color::Red,
                series_index: 0,
                values,
                connect: false,
            });
        }
    }

    Ok(Figure {
        number,
        title: format!("Boxplots by {group_var}"),
        x_title: "Variables".to_owned(),
        y_title: "Value".to_owned(),
        body: BoxPlot {
            categories: variables.iter().map(|v| v.as_ref().to_owned()).collect(),
            series,
            markers,
        }
        .into(),
    })
}

/// One statistic of several variables across groups.
pub fn statistic_trend<S>(
    number: FigureNumber,
    tidy: &TidyTable,
    group_var: &str,
    stat: Statistic,
    variables: &[S],
) -> Result<Figure, FigureError>
where
    S: AsRef<str>,
{
    let series = variables
        .iter()
        .enumerate()
        .map(|(index, variable)| {
            let variable = variable.as_ref();
            Ok(LineSeries {
                label: variable.to_owned(),
                color: cycle(&SERIES_COLORS, index),
                values: stat_series(tidy, stat, variable)?,
            })
        })
        .collect::<Result<Vec<_>, FigureError>>()?;
    let names = variables.iter().map(AsRef::as_ref).collect::<Vec<_>>();

    Ok(Figure {
        number,
        title: format!("{stat} of {}", names.join(", ")),
        x_title: group_var.to_owned(),
        y_title: stat.label().to_owned(),
        body: LinePlot {
            categories: owned(&tidy.groups()),
            series,
        }
        .into(),
    })
}

/// Q3, mean, Q2 and Q1 of one variable across groups.
pub fn quartile_trends(
    number: FigureNumber,
    tidy: &TidyTable,
    group_var: &str,
    variable: &str,
) -> Result<Figure, FigureError> {
    let series = TREND_STATISTICS
        .iter()
        .map(|&(stat, color)| {
            Ok(LineSeries {
                label: stat.label().to_owned(),
                color,
                values: stat_series(tidy, stat, variable)?,
            })
        })
        .collect::<Result<Vec<_>, FigureError>>()?;

    Ok(Figure {
        number,
        title: format!("Statistics of {variable}"),
        x_title: group_var.to_owned(),
        y_title: "Statistic".to_owned(),
        body: LinePlot {
            categories: owned(&tidy.groups()),
            series,
        }
        .into(),
    })
}

/// `var_a - var_b` for Q3, mean, Q2 and Q1 across groups.
pub fn difference_trends(
    number: FigureNumber,
    tidy: &TidyTable,
    group_var: &str,
    var_a: &str,
    var_b: &str,
) -> Result<Figure, FigureError> {
    let series = TREND_STATISTICS
        .iter()
        .map(|&(stat, color)| {
            let a = stat_series(tidy, stat, var_a)?;
            let b = stat_series(tidy, stat, var_b)?;
            Ok(LineSeries {
                label: stat.label().to_owned(),
                color,
                values: a
                    .into_iter()
                    .zip(b)
                    .map(|(a, b)| a.zip(b).map(|(a, b)| a - b))
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, FigureError>>()?;

    Ok(Figure {
        number,
        title: format!("Difference of statistics ({var_a} - {var_b})"),
        x_title: group_var.to_owned(),
        y_title: "Value".to_owned(),
        body: LinePlot {
            categories: owned(&tidy.groups()),
            series,
        }
        .into(),
    })
}

/// Observations and the fitted regression line.
#[must_use]
pub fn regression_scatter(number: FigureNumber, report: &RegressionReport) -> Figure {
    Figure {
        number,
        title: "Scatter plot".to_owned(),
        x_title: report.x.clone(),
        y_title: report.y.clone(),
        body: ScatterPlot {
            points: report
                .x_values
                .iter()
                .copied()
                .zip(report.y_values.iter().copied())
                .collect(),
            line: FittedLine {
                label: format!("Linear regression: {}", report.equation()),
                slope: report.fit.slope,
                intercept: report.fit.intercept,
            },
        }
        .into(),
    }
}
