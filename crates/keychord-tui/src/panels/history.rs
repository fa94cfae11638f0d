//! History panel: every command the resolver has invoked.

use std::time::Duration;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{FollowScroll, PanelState};

/// Oldest entries are dropped past this many.
const MAX_ENTRIES: usize = 1000;

/// One invoked command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Time since the TUI started.
    pub at: Duration,
    pub command: String,
    pub count: u32,
    /// Whether the TUI has an action for this command.
    pub known: bool,
}

/// Scrollable list of invoked commands.
pub struct HistoryPanel {
    entries: Vec<HistoryEntry>,
    scroll: FollowScroll,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll: FollowScroll::new(),
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(entry);
        self.scroll.refresh();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll.bottom();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        if self.entries.is_empty() {
            let empty = Paragraph::new("  (no commands yet; try 3j or gg)")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(" History (0) ").borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }

        let total = self.entries.len();
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(self.scroll.skip(total, visible_height))
            .take(visible_height)
            .map(|entry| {
                let command_style = if entry.known {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>8.2}s ", entry.at.as_secs_f64()),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{:>5}x ", entry.count),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(entry.command.as_str(), command_style),
                ]))
            })
            .collect();

        let title = format!(" History ({total}) ");
        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelState for HistoryPanel {
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
