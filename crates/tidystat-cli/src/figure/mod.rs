//! Figures as plain data
//!
//! Builders in [`build`] turn statistics into [`Figure`] values; [`widget`]
//! draws them with ratatui and [`snapshot`] renders them to text files. A
//! figure carries the [`FigureNumber`] it was built with; callers thread the
//! next number themselves.

use std::fmt;

use ratatui::style::Color;
use tidystat_stats::boxplot::BoxStats;

pub mod build;
pub mod snapshot;
pub mod widget;

/// Number shown in a figure's title, starting from the configured first
/// figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FigureNumber(u32);

impl FigureNumber {
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The number following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for FigureNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub number: FigureNumber,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub body: FigureBody,
}

#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum FigureBody {
    Lines(LinePlot),
    Boxes(BoxPlot),
    Scatter(ScatterPlot),
}

/// Series of values over categorical x positions `1..=n`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub categories: Vec<String>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: Color,
    /// One value per category; `None` leaves a gap.
    pub values: Vec<Option<f64>>,
}

/// Side-by-side boxes, one slot per category and one box per series within
/// each slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlot {
    pub categories: Vec<String>,
    pub series: Vec<BoxSeries>,
    /// Point markers drawn over the boxes.
    pub markers: Vec<MarkerSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSeries {
    pub label: String,
    pub color: Color,
    /// One box per category; `None` for a category without values.
    pub boxes: Vec<Option<BoxStats>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSeries {
    pub label: String,
    pub color: Color,
    /// Index of the box series the markers are aligned with.
    pub series_index: usize,
    pub values: Vec<Option<f64>>,
    /// Join consecutive markers with a dashed line.
    pub connect: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub points: Vec<(f64, f64)>,
    pub line: FittedLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedLine {
    pub label: String,
    pub slope: f64,
    pub intercept: f64,
}

/// Total width of the boxes sharing one category slot.
pub const BOX_SLOT_WIDTH: f64 = 0.5;

impl BoxPlot {
    /// X coordinate of the center of box `series_index` in category
    /// `category_index`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn box_center(&self, category_index: usize, series_index: usize) -> f64 {
        let count = self.series.len().max(1) as f64;
        let width = BOX_SLOT_WIDTH / count;
        let slot = (category_index + 1) as f64;
        slot - BOX_SLOT_WIDTH / 2.0 + width * (series_index as f64 + 0.5)
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn box_width(&self) -> f64 {
        BOX_SLOT_WIDTH / self.series.len().max(1) as f64 * 0.8
    }
}

impl Figure {
    /// Full title as shown above the plot.
    #[must_use]
    pub fn heading(&self) -> String {
        format!("Figure {}: {}", self.number, self.title)
    }

    /// `(min, max)` of every y value drawn, widened by a margin. `None` for a
    /// figure with no data.
    #[must_use]
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        let values: Vec<f64> = match &self.body {
            FigureBody::Lines(plot) => plot
                .series
                .iter()
                .flat_map(|s| s.values.iter().flatten().copied())
                .collect(),
            FigureBody::Boxes(plot) => plot
                .series
                .iter()
                .flat_map(|s| s.boxes.iter().flatten())
                .flat_map(|b| {
                    let (low, high) = b.extent();
                    [low, high]
                })
                .chain(
                    plot.markers
                        .iter()
                        .flat_map(|m| m.values.iter().flatten().copied()),
                )
                .collect(),
            FigureBody::Scatter(plot) => {
                let (x_min, x_max) = min_max(plot.points.iter().map(|p| p.0))?;
                plot.points
                    .iter()
                    .map(|p| p.1)
                    .chain([plot.line.at(x_min), plot.line.at(x_max)])
                    .collect()
            }
        };
        let (min, max) = min_max(values.into_iter())?;
        Some(pad([min, max]))
    }

    /// `(min, max)` of the x axis.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        match &self.body {
            // Category labels are spread evenly between the bounds, so a
            // line plot spans exactly from the first to the last category.
            FigureBody::Lines(plot) => match plot.categories.len() {
                0 => None,
                1 => Some([0.0, 2.0]),
                n => Some([1.0, n as f64]),
            },
            FigureBody::Boxes(plot) => {
                (!plot.categories.is_empty()).then(|| [0.5, plot.categories.len() as f64 + 0.5])
            }
            FigureBody::Scatter(plot) => {
                let (min, max) = min_max(plot.points.iter().map(|p| p.0))?;
                Some(pad([min, max]))
            }
        }
    }
}

impl FittedLine {
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

fn min_max<I>(values: I) -> Option<(f64, f64)>
where
    I: Iterator<Item = f64>,
{
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
    })
}

/// Widens a range by 5% on both sides, or by 1 when it is a single point.
fn pad([min, max]: [f64; 2]) -> [f64; 2] {
    let margin = if max > min { (max - min) * 0.05 } else { 1.0 };
    [min - margin, max + margin]
}
