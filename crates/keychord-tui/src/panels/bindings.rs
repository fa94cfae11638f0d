//! Bindings panel: every chord in the forest and the command it runs.

use keychord_core::BindingForest;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

use super::PanelState;

use crate::host::Action;

/// Table of `chord -> command`, sorted by chord.
pub struct BindingsPanel {
    rows: Vec<(String, String)>,
    /// First visible row.
    scroll_offset: usize,
}

impl BindingsPanel {
    pub fn new(forest: &BindingForest) -> Self {
        let rows = forest
            .bindings()
            .into_iter()
            .map(|(chord, command)| (display_chord(&chord), command.to_string()))
            .collect();
        Self {
            rows,
            scroll_offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(3) as usize;

        let rows: Vec<Row> = self
            .rows
            .iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .map(|(chord, command)| {
                let command_style = if Action::from_command(command).is_some() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Row::new(vec![
                    Cell::from(Span::styled(
                        chord.as_str(),
                        Style::default().fg(Color::Yellow),
                    )),
                    Cell::from(Span::styled(command.as_str(), command_style)),
                ])
            })
            .collect();

        let title = format!(" Bindings ({}) ", self.rows.len());
        let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)])
            .header(
                Row::new(vec!["Chord", "Command"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }
}

/// Chords are shown key by key so that `gg` reads as `g g`.
fn display_chord(chord: &str) -> String {
    chord
        .chars()
        .map(|c| match c {
            ' ' => "<space>".to_string(),
            c => c.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl PanelState for BindingsPanel {
    fn scroll_down(&mut self, n: usize) {
        let max = self.rows.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + n).min(max);
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.rows.len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn panel() -> BindingsPanel {
        let forest = BindingForest::parse(
            r#"
            j = "scroll-down"
            " " = "leader"
            [g]
            g = "scroll-to-top"
            "#,
        )
        .unwrap();
        BindingsPanel::new(&forest)
    }

    #[test]
    fn test_rows_sorted_and_spaced() {
        let panel = panel();
        assert_eq!(
            panel.rows,
            vec![
                ("<space>".to_string(), "leader".to_string()),
                ("g g".to_string(), "scroll-to-top".to_string()),
                ("j".to_string(), "scroll-down".to_string()),
            ]
        );
    }

    #[test]
    fn test_scroll_clamped() {
        let mut panel = panel();
        panel.scroll_down(10);
        assert_eq!(panel.scroll_offset, 2);
        panel.scroll_up(1);
        assert_eq!(panel.scroll_offset, 1);
        panel.scroll_to_top();
        assert_eq!(panel.scroll_offset, 0);
        panel.scroll_to_bottom();
        assert_eq!(panel.scroll_offset, 2);
    }
}
