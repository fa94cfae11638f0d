//! TUI panel implementations.

mod bindings;
mod history;
mod logs;
mod resolver;

pub use bindings::BindingsPanel;
pub use history::{HistoryEntry, HistoryPanel};
pub use logs::LogsPanel;
pub use resolver::{ResolverPanel, ResolverSnapshot};

/// Trait for panels that support scrolling.
pub trait PanelState {
    /// Scroll down by `n` lines.
    fn scroll_down(&mut self, n: usize);

    /// Scroll up by `n` lines.
    fn scroll_up(&mut self, n: usize);

    /// Scroll to the very top.
    fn scroll_to_top(&mut self);

    /// Scroll to the very bottom.
    fn scroll_to_bottom(&mut self);
}

/// Scroll position of a list that normally sticks to its newest entry.
///
/// `offset` counts lines up from the bottom; while `follow` is set the
/// offset stays at zero as entries arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowScroll {
    offset: usize,
    follow: bool,
}

impl FollowScroll {
    pub fn new() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }

    pub fn offset(self) -> usize {
        self.offset
    }

    pub fn following(self) -> bool {
        self.follow
    }

    /// New entries arrived.
    pub fn refresh(&mut self) {
        if self.follow {
            self.offset = 0;
        }
    }

    pub fn down(&mut self, n: usize) {
        if self.offset >= n {
            self.offset -= n;
        } else {
            self.offset = 0;
            self.follow = true;
        }
    }

    pub fn up(&mut self, n: usize, len: usize) {
        self.follow = false;
        self.offset = self.offset.saturating_add(n).min(len.saturating_sub(1));
    }

    pub fn top(&mut self, len: usize) {
        self.follow = false;
        self.offset = len.saturating_sub(1);
    }

    pub fn bottom(&mut self) {
        self.offset = 0;
        self.follow = true;
    }

    /// How many entries to skip so that `height` lines end `offset` lines
    /// above the newest of `total`.
    pub fn skip(self, total: usize, height: usize) -> usize {
        total.saturating_sub(height.saturating_add(self.offset))
    }
}

impl Default for FollowScroll {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_scroll_up_and_back_down() {
        let mut scroll = FollowScroll::new();
        scroll.up(3, 20);
        assert!(!scroll.following());
        assert_eq!(scroll.offset(), 3);

        scroll.down(10);
        assert!(scroll.following());
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_follow_scroll_clamps_to_len() {
        let mut scroll = FollowScroll::new();
        scroll.up(100, 5);
        assert_eq!(scroll.offset(), 4);

        scroll.top(0);
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_follow_scroll_skip() {
        let mut scroll = FollowScroll::new();
        assert_eq!(scroll.skip(50, 10), 40);
        scroll.up(5, 50);
        assert_eq!(scroll.skip(50, 10), 35);
        assert_eq!(scroll.skip(4, 10), 0);
    }

    #[test]
    fn test_refresh_keeps_offset_when_not_following() {
        let mut scroll = FollowScroll::new();
        scroll.up(2, 10);
        scroll.refresh();
        assert_eq!(scroll.offset(), 2);
        scroll.bottom();
        scroll.refresh();
        assert_eq!(scroll.offset(), 0);
    }
}
