//! Logs panel: what the resolver has been logging, newest at the bottom.

use keychord_core::{LogEntry, LogReader};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use tracing::Level;

use super::{FollowScroll, PanelState};

/// Scrollable log viewer with auto-follow.
pub struct LogsPanel {
    reader: LogReader,
    /// Snapshot taken on the last tick.
    entries: Vec<LogEntry>,
    scroll: FollowScroll,
}

impl LogsPanel {
    pub fn new(reader: LogReader) -> Self {
        Self {
            reader,
            entries: Vec::new(),
            scroll: FollowScroll::new(),
        }
    }

    /// Re-read the collector.
    pub fn refresh(&mut self) {
        self.entries = self.reader.entries();
        self.scroll.refresh();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        if self.entries.is_empty() {
            let empty = Paragraph::new("  (no log entries yet)")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(" Logs (0) ").borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }

        let total = self.entries.len();
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(self.scroll.skip(total, visible_height))
            .take(visible_height)
            .map(log_line)
            .map(ListItem::new)
            .collect();

        let follow = if self.scroll.following() { " [follow]" } else { "" };
        let title = format!(" Logs ({total}){follow} ");
        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }
}

fn level_style(level: Level) -> Style {
    let color = match level {
        Level::ERROR => Color::Red,
        Level::WARN => Color::Yellow,
        Level::INFO => Color::Green,
        Level::DEBUG => Color::Blue,
        Level::TRACE => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn log_line(entry: &LogEntry) -> Line<'_> {
    let mut spans = vec![
        Span::styled(
            format!("{:>8.2}s ", entry.elapsed_secs),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:>5} ", entry.level), level_style(entry.level)),
        Span::raw(entry.message.as_str()),
    ];
    for (name, value) in &entry.fields {
        spans.push(Span::styled(
            format!(" {name}="),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(value.as_str(), Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

impl PanelState for LogsPanel {
    fn scroll_down(&mut self, n: usize) {
        self.scroll.down(n);
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll.up(n, self.entries.len());
    }

    fn scroll_to_top(&mut self) {
        self.scroll.top(self.entries.len());
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll.bottom();
    }
}
