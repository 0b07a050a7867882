use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget,
        canvas::{Canvas, Context, Line as CanvasLine, Points, Rectangle},
    },
};

use super::{BoxPlot, Figure, FigureBody, LinePlot, ScatterPlot};

/// Segments per dashed connection between two markers.
const DASH_SEGMENTS: usize = 8;
/// Width of the y-axis label column of box plots.
const Y_LABEL_WIDTH: u16 = 8;

/// Draws one [`Figure`] inside a titled border.
pub struct FigureWidget<'a> {
    pub figure: &'a Figure,
}

impl Widget for FigureWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let figure = self.figure;
        let block = Block::bordered().title(figure.heading());
        let inner = block.inner(area);
        Widget::render(block, area, buf);

        let (Some(x_bounds), Some(y_bounds)) = (figure.x_bounds(), figure.y_bounds()) else {
            Paragraph::new("No data to plot.")
                .centered()
                .render(inner, buf);
            return;
        };
        match &figure.body {
            FigureBody::Lines(plot) => {
                LineChart {
                    figure,
                    plot,
                    x_bounds,
                    y_bounds,
                }
                .render(inner, buf);
            }
            FigureBody::Scatter(plot) => {
                ScatterChart {
                    figure,
                    plot,
                    x_bounds,
                    y_bounds,
                }
                .render(inner, buf);
            }
            FigureBody::Boxes(plot) => {
                BoxChart {
                    figure,
                    plot,
                    x_bounds,
                    y_bounds,
                }
                .render(inner, buf);
            }
        }
    }
}

fn value_labels([low, high]: [f64; 2]) -> [String; 3] {
    [
        format!("{low:.2}"),
        format!("{:.2}", f64::midpoint(low, high)),
        format!("{high:.2}"),
    ]
}

struct LineChart<'a> {
    figure: &'a Figure,
    plot: &'a LinePlot,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl Widget for LineChart<'_> {
    #[expect(clippy::cast_precision_loss)]
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let points = self
            .plot
            .series
            .iter()
            .map(|series| {
                series
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| ((i + 1) as f64, v)))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let datasets = self
            .plot
            .series
            .iter()
            .zip(&points)
            .map(|(series, points)| {
                Dataset::default()
                    .name(series.label.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(series.color))
                    .data(points)
            })
            .collect::<Vec<_>>();

        let mut x_labels = self.plot.categories.clone();
        if x_labels.len() == 1 {
            x_labels.insert(0, String::new());
            x_labels.push(String::new());
        }
        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title(self.figure.x_title.clone())
                    .bounds(self.x_bounds)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(self.figure.y_title.clone())
                    .bounds(self.y_bounds)
                    .labels(value_labels(self.y_bounds)),
            )
            .legend_position(Some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Percentage(50), Constraint::Percentage(50)));

        Widget::render(chart, area, buf);
    }
}

struct ScatterChart<'a> {
    figure: &'a Figure,
    plot: &'a ScatterPlot,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl Widget for ScatterChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let [x_low, x_high] = self.x_bounds;
        let line = self.plot.line.clone();
        let line_points = [(x_low, line.at(x_low)), (x_high, line.at(x_high))];
        let datasets = vec![
            Dataset::default()
                .name("observations")
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Red))
                .data(&self.plot.points),
            Dataset::default()
                .name(line.label)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Blue))
                .data(&line_points),
        ];
        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title(self.figure.x_title.clone())
                    .bounds(self.x_bounds)
                    .labels(value_labels(self.x_bounds)),
            )
            .y_axis(
                Axis::default()
                    .title(self.figure.y_title.clone())
                    .bounds(self.y_bounds)
                    .labels(value_labels(self.y_bounds)),
            )
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Percentage(80), Constraint::Percentage(50)));

        Widget::render(chart, area, buf);
    }
}

struct BoxChart<'a> {
    figure: &'a Figure,
    plot: &'a BoxPlot,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl BoxChart<'_> {
    fn paint(&self, ctx: &mut Context<'_>, label_y: f64) {
        let plot = self.plot;
        let half = plot.box_width() / 2.0;
        let cap = half / 2.0;
        for (series_index, series) in plot.series.iter().enumerate() {
            let color = series.color;
            for (category_index, stats) in series.boxes.iter().enumerate() {
                let Some(stats) = stats else { continue };
                let x = plot.box_center(category_index, series_index);
                ctx.draw(&Rectangle {
                    x: x - half,
                    y: stats.q1,
                    width: 2.0 * half,
                    height: stats.q3 - stats.q1,
                    color,
                });
                let segments = [
                    (x - half, stats.median, x + half, stats.median),
                    (x, stats.whisker_low, x, stats.q1),
                    (x, stats.q3, x, stats.whisker_high),
                    (x - cap, stats.whisker_low, x + cap, stats.whisker_low),
                    (x - cap, stats.whisker_high, x + cap, stats.whisker_high),
                ];
                for (x1, y1, x2, y2) in segments {
                    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
                }
                let outliers = stats.outliers.iter().map(|&y| (x, y)).collect::<Vec<_>>();
                ctx.draw(&Points {
                    coords: &outliers,
                    color,
                });
            }
        }

        ctx.layer();
        for markers in &plot.markers {
            let positions = markers
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (plot.box_center(i, markers.series_index), v)))
                .collect::<Vec<_>>();
            if markers.connect {
                for pair in positions.windows(2) {
                    draw_dashed(ctx, pair[0], pair[1], markers.color);
                }
            }
            for &(x, y) in &positions {
                ctx.print(x, y, Line::styled("x", Style::default().fg(markers.color)));
            }
        }

        for (category_index, category) in plot.categories.iter().enumerate() {
            let x = plot.box_center(category_index, 0) - half;
            ctx.print(x, label_y, Line::raw(category.clone()));
        }
    }

    fn legend(&self) -> Line<'static> {
        let mut spans = vec![];
        for series in &self.plot.series {
            spans.push(Span::styled("■ ", Style::default().fg(series.color)));
            spans.push(Span::raw(format!("{}  ", series.label)));
        }
        for markers in &self.plot.markers {
            spans.push(Span::styled("x ", Style::default().fg(markers.color)));
            spans.push(Span::raw(format!("{}  ", markers.label)));
        }
        spans.push(Span::styled(
            format!("[{} / {}]", self.figure.x_title, self.figure.y_title),
            Style::default().fg(Color::DarkGray),
        ));
        Line::from(spans)
    }
}

impl Widget for BoxChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let [plot_area, legend_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let [label_area, canvas_area] =
            Layout::horizontal([Constraint::Length(Y_LABEL_WIDTH), Constraint::Fill(1)])
                .areas(plot_area);

        // Leave a row of room under the data for the category labels.
        let [low, high] = self.y_bounds;
        let rows = f64::from(canvas_area.height.max(2));
        let y_bounds = [low - (high - low) / rows, high];

        let mut labels = vec![Line::raw(""); usize::from(label_area.height)];
        let [bottom, middle, top] = value_labels(self.y_bounds);
        if let Some(first) = labels.first_mut() {
            *first = Line::raw(top).right_aligned();
        }
        let mid = labels.len() / 2;
        if let Some(line) = labels.get_mut(mid) {
            *line = Line::raw(middle).right_aligned();
        }
        if labels.len() > 2 {
            let last = labels.len() - 2;
            labels[last] = Line::raw(bottom).right_aligned();
        }
        Paragraph::new(labels).render(label_area, buf);

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(self.x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| self.paint(ctx, y_bounds[0]));
        canvas.render(canvas_area, buf);
        Paragraph::new(self.legend()).render(legend_area, buf);
    }
}

#[expect(clippy::cast_precision_loss)]
fn draw_dashed(ctx: &mut Context<'_>, (x1, y1): (f64, f64), (x2, y2): (f64, f64), color: Color) {
    let step = |i: usize| {
        let t = i as f64 / DASH_SEGMENTS as f64;
        (x1 + (x2 - x1) * t, y1 + (y2 - y1) * t)
    };
    for i in (0..DASH_SEGMENTS).step_by(2) {
        let (ax, ay) = step(i);
        let (bx, by) = step(i + 1);
        ctx.draw(&CanvasLine::new(ax, ay, bx, by, color));
    }
}

#[cfg(test)]
mod tests {
    use tidystat_stats::boxplot::BoxStats;

    use super::*;
    use crate::figure::{BoxSeries, FigureNumber, FittedLine, LineSeries, MarkerSeries, snapshot};

    fn render(figure: &Figure) -> String {
        snapshot::render_to_string(figure, 80, 24)
    }

    #[test]
    fn test_line_figure_shows_title_and_legend() {
        let figure = Figure {
            number: FigureNumber::new(2),
            title: "mean of Pre-D, Post-D".to_owned(),
            x_title: "Mar".to_owned(),
            y_title: "mean".to_owned(),
            body: LinePlot {
                categories: vec!["0".to_owned(), "1".to_owned()],
                series: vec![
                    LineSeries {
                        label: "Pre-D".to_owned(),
                        color: Color::Red,
                        values: vec![Some(14.0), Some(16.0)],
                    },
                    LineSeries {
                        label: "Post-D".to_owned(),
                        color: Color::Green,
                        values: vec![Some(12.0), None],
                    },
                ],
            }
            .into(),
        };
        let text = render(&figure);
        assert!(text.contains("Figure 2: mean of Pre-D, Post-D"));
        assert!(text.contains("Pre-D"));
        assert!(text.contains("Post-D"));
        assert!(text.contains("16.20"));
    }

    #[test]
    fn test_box_figure_shows_categories_and_legend() {
        let figure = Figure {
            number: FigureNumber::new(1),
            title: "Boxplots Pre-D and Post-D".to_owned(),
            x_title: "Mar".to_owned(),
            y_title: "Value".to_owned(),
            body: BoxPlot {
                categories: vec!["NoMar".to_owned(), "Mar".to_owned()],
                series: vec![BoxSeries {
                    label: "Pre-D".to_owned(),
                    color: Color::Red,
                    boxes: vec![
                        BoxStats::new([10.0, 12.0, 14.0, 16.0]),
                        BoxStats::new([11.0, 13.0, 40.0]),
                    ],
                }],
                markers: vec![MarkerSeries {
                    label: "mean Pre-D".to_owned(),
                    color: Color::Red,
                    series_index: 0,
                    values: vec![Some(13.0), Some(21.33)],
                    connect: true,
                }],
            }
            .into(),
        };
        let text = render(&figure);
        assert!(text.contains("Figure 1: Boxplots Pre-D and Post-D"));
        assert!(text.contains("NoMar"));
        assert!(text.contains("■ Pre-D"));
        assert!(text.contains("x mean Pre-D"));
    }

    #[test]
    fn test_scatter_figure_shows_equation() {
        let figure = Figure {
            number: FigureNumber::new(5),
            title: "Scatter plot".to_owned(),
            x_title: "Post-D".to_owned(),
            y_title: "Post-Son".to_owned(),
            body: ScatterPlot {
                points: vec![(1.0, 2.0), (2.0, 4.1), (3.0, 5.9)],
                line: FittedLine {
                    label: "y=1.95x+0.07".to_owned(),
                    slope: 1.95,
                    intercept: 0.07,
                },
            }
            .into(),
        };
        let text = render(&figure);
        assert!(text.contains("Figure 5: Scatter plot"));
        assert!(text.contains("y=1.95x+0.07"));
    }

    #[test]
    fn test_empty_figure() {
        let figure = Figure {
            number: FigureNumber::new(1),
            title: "Empty".to_owned(),
            x_title: String::new(),
            y_title: String::new(),
            body: LinePlot {
                categories: vec![],
                series: vec![],
            }
            .into(),
        };
        assert!(render(&figure).contains("No data to plot."));
    }
}
