//! Static text renderings of figures
//!
//! A snapshot renders a figure into an off-screen buffer and keeps the
//! characters, one line per terminal row. Colors are dropped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget as _};

use super::{Figure, widget::FigureWidget};

pub const SNAPSHOT_WIDTH: u16 = 100;
pub const SNAPSHOT_HEIGHT: u16 = 32;

/// Renders `figure` into a `width` x `height` character grid.
#[must_use]
pub fn render_to_string(figure: &Figure, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    FigureWidget { figure }.render(area, &mut buf);

    let mut text = String::new();
    for y in area.top()..area.bottom() {
        let row = (area.left()..area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>();
        text.push_str(row.trim_end());
        text.push('\n');
    }
    text
}

/// Writes every figure to `<dir>/figure_<n>.txt`, creating `dir` if needed.
pub fn write_snapshots(dir: &Path, figures: &[Figure]) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create figures directory: {}", dir.display()))?;
    figures
        .iter()
        .map(|figure| {
            let path = dir.join(format!("figure_{}.txt", figure.number.get()));
            let text = render_to_string(figure, SNAPSHOT_WIDTH, SNAPSHOT_HEIGHT);
            fs::write(&path, text)
                .with_context(|| format!("Failed to write figure: {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote figure snapshot");
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;
    use tempfile::TempDir;

    use super::*;
    use crate::figure::{FigureNumber, LinePlot, LineSeries};

    fn figure(number: u32) -> Figure {
        Figure {
            number: FigureNumber::new(number),
            title: "Statistics of Pre-D".to_owned(),
            x_title: "Mar".to_owned(),
            y_title: "Statistic".to_owned(),
            body: LinePlot {
                categories: vec!["0".to_owned(), "1".to_owned(), "2".to_owned()],
                series: vec![LineSeries {
                    label: "Q2".to_owned(),
                    color: Color::Blue,
                    values: vec![Some(12.0), Some(13.5), Some(11.0)],
                }],
            }
            .into(),
        }
    }

    #[test]
    fn test_render_to_string_has_one_line_per_row() {
        let text = render_to_string(&figure(1), 60, 20);
        assert_eq!(text.lines().count(), 20);
        assert!(text.lines().all(|line| line.chars().count() <= 60));
        let title = text.lines().next().unwrap();
        assert!(title.contains("Figure 1: Statistics of Pre-D"));
    }

    #[test]
    fn test_write_snapshots_names_files_by_number() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("figures");
        let written = write_snapshots(&out, &[figure(3), figure(4)]).unwrap();
        let expected = [out.join("figure_3.txt"), out.join("figure_4.txt")];
        assert_eq!(written, expected);
        let text = fs::read_to_string(&written[1]).unwrap();
        assert!(text.contains("Figure 4:"));
    }
}
