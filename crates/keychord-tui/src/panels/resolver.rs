//! Resolver panel: live state of the key sequence resolver.

use std::time::Duration;

use keychord_core::{KeyEventSource, KeySequenceResolver};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::PanelState;

/// What the resolver looked like on the last tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverSnapshot {
    pub idle: bool,
    pub count: u32,
    pub pending: String,
    pub match_depth: usize,
    pub held_keydowns: usize,
    pub count_prefix_enabled: bool,
}

impl ResolverSnapshot {
    pub fn capture<H, S>(resolver: &KeySequenceResolver<H, S>) -> Self
    where
        H: keychord_core::CommandHandler,
        S: KeyEventSource,
    {
        Self {
            idle: resolver.is_idle(),
            count: resolver.count_prefix(),
            pending: resolver.pending_chord(),
            match_depth: resolver.match_depth(),
            held_keydowns: resolver.pending_suppressed(),
            count_prefix_enabled: resolver.options().count_prefix,
        }
    }

    /// The sequence typed so far, vim style: `3g`.
    pub fn typed(&self) -> String {
        let mut typed = String::new();
        if self.count > 0 {
            typed.push_str(&self.count.to_string());
        }
        typed.push_str(&self.pending);
        typed
    }
}

/// Dashboard showing resolver state, uptime and build info.
pub struct ResolverPanel {
    pub uptime: Duration,
    pub snapshot: ResolverSnapshot,
    pub last_command: Option<(String, u32)>,
    pub suppressed_events: u64,
    pub bindings: usize,
    pub log_level: String,
    pub version: String,
}

impl ResolverPanel {
    pub fn new(bindings: usize, log_level: &str) -> Self {
        Self {
            uptime: Duration::ZERO,
            snapshot: ResolverSnapshot {
                idle: true,
                ..ResolverSnapshot::default()
            },
            last_command: None,
            suppressed_events: 0,
            bindings,
            log_level: log_level.to_string(),
            version: keychord_core::build_info::version_string(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let (state, state_style) = if self.snapshot.idle {
            ("idle", Style::default().fg(Color::Green))
        } else {
            ("pending", Style::default().fg(Color::Yellow))
        };
        let typed = self.snapshot.typed();
        let last = match &self.last_command {
            Some((command, count)) => format!("{command} x{count}"),
            None => "-".to_string(),
        };
        let status_text = vec![
            Line::from(vec![
                Span::styled("State:  ", Style::default().fg(Color::Gray)),
                Span::styled(state, state_style),
                Span::raw("  "),
                Span::styled(typed, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Last:   ", Style::default().fg(Color::Gray)),
                Span::raw(last),
            ]),
            Line::from(vec![
                Span::styled("Uptime: ", Style::default().fg(Color::Gray)),
                Span::raw(format_duration(self.uptime)),
            ]),
        ];
        let status = Paragraph::new(status_text)
            .block(Block::default().title(" Resolver ").borders(Borders::ALL));
        frame.render_widget(status, chunks[0]);

        let count_prefix = if self.snapshot.count_prefix_enabled {
            Span::styled("enabled", Style::default().fg(Color::Green))
        } else {
            Span::styled("disabled", Style::default().fg(Color::DarkGray))
        };
        let rows = vec![
            Row::new(vec![Cell::from("Count prefix"), Cell::from(count_prefix)]),
            Row::new(vec![
                Cell::from("Count"),
                Cell::from(self.snapshot.count.to_string()),
            ]),
            Row::new(vec![
                Cell::from("Candidates"),
                Cell::from(self.snapshot.match_depth.to_string()),
            ]),
            Row::new(vec![
                Cell::from("Held keys"),
                Cell::from(self.snapshot.held_keydowns.to_string()),
            ]),
            Row::new(vec![
                Cell::from("Suppressed"),
                Cell::from(self.suppressed_events.to_string()),
            ]),
            Row::new(vec![
                Cell::from("Bindings"),
                Cell::from(self.bindings.to_string()),
            ]),
            Row::new(vec![
                Cell::from("Log level"),
                Cell::from(self.log_level.as_str()),
            ]),
            Row::new(vec![
                Cell::from("Build"),
                Cell::from(self.version.as_str()),
            ]),
        ];

        let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(10)])
            .header(
                Row::new(vec!["Field", "Value"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().title(" Details ").borders(Borders::ALL));
        frame.render_widget(table, chunks[1]);
    }
}

impl PanelState for ResolverPanel {
    // Fits on one screen.
    fn scroll_down(&mut self, _n: usize) {}
    fn scroll_up(&mut self, _n: usize) {}
    fn scroll_to_top(&mut self) {}
    fn scroll_to_bottom(&mut self) {}
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use keychord_core::script::{self, ScriptSource};
    use keychord_core::{BindingForest, Invocations, ResolverOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_duration(Duration::from_secs(3661)), "01:01:01");
    }

    #[test]
    fn test_snapshot_of_pending_chord() {
        let mut resolver = KeySequenceResolver::new(
            Invocations::default(),
            ScriptSource::new(),
            BindingForest::parse("[g]\ng = \"scroll-to-top\"").unwrap(),
            ResolverOptions::default(),
        );
        script::play(&mut resolver, &script::parse("12 +g").unwrap());

        let snapshot = ResolverSnapshot::capture(&resolver);
        assert_eq!(
            snapshot,
            ResolverSnapshot {
                idle: false,
                count: 12,
                pending: "g".to_string(),
                match_depth: 2,
                held_keydowns: 1,
                count_prefix_enabled: true,
            }
        );
        assert_eq!(snapshot.typed(), "12g");
    }

    #[test]
    fn test_new_panel_is_idle() {
        let panel = ResolverPanel::new(12, "info");
        assert!(panel.snapshot.idle);
        assert_eq!(panel.snapshot.typed(), "");
        assert!(panel.last_command.is_none());
        assert!(panel.version.starts_with(keychord_core::build_info::VERSION));
    }
}
