//! Full-screen figure viewer
//!
//! Shows one figure at a time; the arrow keys page through them and `q`
//! closes the viewer.

use crossterm::event::{self, Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::figure::{Figure, widget::FigureWidget};

#[derive(Debug)]
pub struct FigureViewer<'a> {
    figures: &'a [Figure],
    selected: usize,
    should_exit: bool,
}

impl<'a> FigureViewer<'a> {
    #[must_use]
    pub fn new(figures: &'a [Figure]) -> Self {
        Self {
            figures,
            selected: 0,
            should_exit: figures.is_empty(),
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn draw(&self, frame: &mut Frame) {
        let [figure_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        if let Some(figure) = self.figures.get(self.selected) {
            frame.render_widget(FigureWidget { figure }, figure_area);
        }

        let help_text = Text::from(format!(
            "{}/{} | ←/→: Previous/Next | q/Esc: Quit",
            self.selected + 1,
            self.figures.len()
        ))
        .style(Style::default().fg(Color::DarkGray))
        .centered();
        frame.render_widget(help_text, help_area);
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Some(event) = event.as_key_event() {
            match event.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
                KeyCode::Left | KeyCode::Char('p' | 'k') if !self.figures.is_empty() => {
                    self.selected = self
                        .selected
                        .checked_sub(1)
                        .unwrap_or(self.figures.len() - 1);
                }
                KeyCode::Right | KeyCode::Char('n' | 'j' | ' ') if !self.figures.is_empty() => {
                    self.selected = (self.selected + 1) % self.figures.len();
                }
                _ => {}
            }
        }
    }
}

/// Shows `figures` until the user quits. Returns immediately when there is
/// nothing to show.
pub fn show(figures: &[Figure]) -> anyhow::Result<()> {
    let mut viewer = FigureViewer::new(figures);
    if viewer.should_exit() {
        return Ok(());
    }
    ratatui::run(|terminal| {
        while !viewer.should_exit() {
            terminal.draw(|frame| viewer.draw(frame))?;
            let event = event::read()?;
            viewer.handle_event(&event);
        }
        Ok(())
    })
}
