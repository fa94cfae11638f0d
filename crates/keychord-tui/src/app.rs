//! Core TUI application state and event handling.

use std::time::Instant;

use crossterm::event::KeyEvent;
use keychord_config::AppConfig;
use keychord_core::{
    BindingForest, Invocations, KeySequenceResolver, LogReader, ResolverOptions,
};
use tracing::{debug, warn};

use crate::host::{Action, TerminalHost, TerminalKeys};
use crate::panels::{
    BindingsPanel, HistoryEntry, HistoryPanel, LogsPanel, PanelState, ResolverPanel,
    ResolverSnapshot,
};

/// The panels available in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Resolver,
    History,
    Bindings,
    Logs,
}

impl Panel {
    pub fn title(self) -> &'static str {
        match self {
            Panel::Resolver => "Resolver",
            Panel::History => "History",
            Panel::Bindings => "Bindings",
            Panel::Logs => "Logs",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Panel::Resolver => 0,
            Panel::History => 1,
            Panel::Bindings => 2,
            Panel::Logs => 3,
        }
    }

    pub fn next(self) -> Self {
        ALL_PANELS[(self.index() + 1) % ALL_PANELS.len()]
    }

    pub fn prev(self) -> Self {
        ALL_PANELS[(self.index() + ALL_PANELS.len() - 1) % ALL_PANELS.len()]
    }
}

pub const ALL_PANELS: [Panel; 4] = [Panel::Resolver, Panel::History, Panel::Bindings, Panel::Logs];

/// Lines moved by one half-page scroll.
const HALF_PAGE: usize = 10;

/// TUI application state.
pub struct App {
    /// Whether the application should quit.
    pub should_quit: bool,

    /// Currently selected panel.
    pub active_panel: Panel,

    /// Application start time (for uptime and history timestamps).
    pub start_time: Instant,

    /// The resolver and its terminal glue.
    pub host: TerminalHost,

    pub resolver_panel: ResolverPanel,
    pub history: HistoryPanel,
    pub bindings: BindingsPanel,
    pub logs: LogsPanel,
}

impl App {
    /// Create an App from a validated configuration.
    ///
    /// `releases` tells whether the terminal reports key releases.
    pub fn new(
        config: &AppConfig,
        log_reader: LogReader,
        releases: bool,
    ) -> Result<Self, keychord_core::ForestError> {
        let forest = BindingForest::from_config(&config.keymap)?;
        let bindings = BindingsPanel::new(&forest);
        let resolver = KeySequenceResolver::new(
            Invocations::default(),
            TerminalKeys::default(),
            forest,
            ResolverOptions::from(&config.resolver),
        );

        Ok(Self {
            should_quit: false,
            active_panel: Panel::Resolver,
            start_time: Instant::now(),
            host: TerminalHost::new(resolver, releases),
            resolver_panel: ResolverPanel::new(bindings.len(), &config.logging.level),
            history: HistoryPanel::new(),
            bindings,
            logs: LogsPanel::new(log_reader),
        })
    }

    /// Feed a key to the resolver and run whatever it resolved.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        let through = self.host.key(key);

        for invocation in self.host.take_invocations() {
            let action = Action::from_command(&invocation.command);
            self.history.push(HistoryEntry {
                at: self.start_time.elapsed(),
                command: invocation.command.clone(),
                count: invocation.count,
                known: action.is_some(),
            });
            match action {
                Some(action) => self.handle_action(action, invocation.count),
                None => warn!(command = %invocation.command, "No action for command"),
            }
            self.resolver_panel.last_command = Some((invocation.command, invocation.count));
        }

        if through {
            if let Some(action) = Action::fallback(key) {
                debug!(?action, "Unbound key handled by the TUI");
                self.handle_action(action, 1);
            }
        }
        self.refresh_resolver_panel();
    }

    pub fn focus_lost(&mut self) {
        self.host.focus_lost();
        self.refresh_resolver_panel();
    }

    /// Perform an action `count` times where repetition makes sense.
    pub fn handle_action(&mut self, action: Action, count: u32) {
        let n = count as usize;
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPanel => {
                for _ in 0..n % ALL_PANELS.len() {
                    self.active_panel = self.active_panel.next();
                }
            }
            Action::PrevPanel => {
                for _ in 0..n % ALL_PANELS.len() {
                    self.active_panel = self.active_panel.prev();
                }
            }
            Action::GoToPanel(index) => {
                if let Some(&panel) = ALL_PANELS.get(index) {
                    self.active_panel = panel;
                }
            }
            Action::ScrollDown => self.active_panel_state_mut().scroll_down(n),
            Action::ScrollUp => self.active_panel_state_mut().scroll_up(n),
            Action::HalfPageDown => self
                .active_panel_state_mut()
                .scroll_down(n.saturating_mul(HALF_PAGE)),
            Action::HalfPageUp => self
                .active_panel_state_mut()
                .scroll_up(n.saturating_mul(HALF_PAGE)),
            Action::ScrollToTop => self.active_panel_state_mut().scroll_to_top(),
            Action::ScrollToBottom => self.active_panel_state_mut().scroll_to_bottom(),
            Action::ClearHistory => self.history.clear(),
        }
    }

    /// Tick: refresh data from live sources.
    pub fn tick(&mut self) {
        self.logs.refresh();
        self.resolver_panel.uptime = self.start_time.elapsed();
        self.refresh_resolver_panel();
    }

    fn refresh_resolver_panel(&mut self) {
        self.resolver_panel.snapshot = ResolverSnapshot::capture(&self.host.resolver);
        self.resolver_panel.suppressed_events =
            self.host.resolver.source().suppressed_count();
    }

    fn active_panel_state_mut(&mut self) -> &mut dyn PanelState {
        match self.active_panel {
            Panel::Resolver => &mut self.resolver_panel,
            Panel::History => &mut self.history,
            Panel::Bindings => &mut self.bindings,
            Panel::Logs => &mut self.logs,
        }
    }

    /// Get the status line text.
    pub fn status_line(&self) -> String {
        let typed = self.resolver_panel.snapshot.typed();
        let pending = if typed.is_empty() {
            String::new()
        } else {
            format!("  typed:{typed}")
        };
        format!(
            " q:quit  l/h:panels  j/k:scroll  gg/G:top/bottom  Esc:cancel  [{panel}]{pending}",
            panel = self.active_panel.title()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use keychord_core::LogCollector;
    use keychord_test_utils::TestConfigBuilder;
    use pretty_assertions::assert_eq;

    fn make_app() -> App {
        let config = AppConfig::default();
        App::new(&config, LogCollector::new(100).reader(), false).unwrap()
    }

    fn type_keys(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key(&KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn history(app: &App) -> Vec<(String, u32)> {
        app.history
            .entries()
            .iter()
            .map(|e| (e.command.clone(), e.count))
            .collect()
    }

    // ── Panel enum tests ──────────────────────────────────────────

    #[test]
    fn test_panel_indices_match_order() {
        for (i, panel) in ALL_PANELS.iter().enumerate() {
            assert_eq!(panel.index(), i);
        }
    }

    #[test]
    fn test_panel_next_prev_wrap() {
        assert_eq!(Panel::Resolver.next(), Panel::History);
        assert_eq!(Panel::Logs.next(), Panel::Resolver);
        assert_eq!(Panel::Resolver.prev(), Panel::Logs);
        assert_eq!(Panel::History.prev(), Panel::Resolver);
    }

    // ── Key handling ──────────────────────────────────────────────

    #[test]
    fn test_app_defaults() {
        let app = make_app();
        assert!(!app.should_quit);
        assert_eq!(app.active_panel, Panel::Resolver);
        assert!(app.resolver_panel.snapshot.idle);
    }

    #[test_log::test]
    fn test_quit_chord() {
        let mut app = make_app();
        type_keys(&mut app, "z");
        assert!(!app.should_quit);
        assert_eq!(app.resolver_panel.snapshot.pending, "z");
        type_keys(&mut app, "q");
        assert!(app.should_quit);
    }

    #[test_log::test]
    fn test_count_repeats_panel_switch() {
        let mut app = make_app();
        type_keys(&mut app, "2l");
        assert_eq!(app.active_panel, Panel::Bindings);
        assert_eq!(history(&app), vec![("next-panel".to_string(), 2)]);
        assert_eq!(
            app.resolver_panel.last_command,
            Some(("next-panel".to_string(), 2))
        );
    }

    #[test]
    fn test_chord_goes_to_previous_panel() {
        let mut app = make_app();
        type_keys(&mut app, "gT");
        assert_eq!(app.active_panel, Panel::Logs);
    }

    #[test]
    fn test_unbound_tab_uses_fallback() {
        let mut app = make_app();
        app.handle_key(&KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.active_panel, Panel::History);
        assert!(app.history.entries().is_empty());
    }

    #[test_log::test]
    fn test_escape_cancels_pending_count() {
        let mut app = make_app();
        type_keys(&mut app, "5");
        assert_eq!(app.resolver_panel.snapshot.count, 5);
        assert!(app.status_line().contains("typed:5"));

        app.handle_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.resolver_panel.snapshot.idle);
        type_keys(&mut app, "l");
        assert_eq!(history(&app), vec![("next-panel".to_string(), 1)]);
    }

    #[test_log::test]
    fn test_unknown_command_is_recorded() {
        let config = TestConfigBuilder::new().bind("x", "launch-rockets").build();
        let mut app = App::new(&config, LogCollector::new(100).reader(), false).unwrap();
        type_keys(&mut app, "x");
        assert_eq!(app.history.entries().len(), 1);
        assert!(!app.history.entries()[0].known);
    }

    #[test]
    fn test_clear_history() {
        let mut app = make_app();
        type_keys(&mut app, "ll");
        assert_eq!(app.history.entries().len(), 2);
        type_keys(&mut app, "x");
        // clear-history itself is recorded before it runs
        assert!(app.history.entries().is_empty());
    }

    #[test]
    fn test_scroll_actions_no_panic() {
        let mut app = make_app();
        for i in 0..ALL_PANELS.len() {
            app.handle_action(Action::GoToPanel(i), 1);
            for action in [
                Action::ScrollDown,
                Action::ScrollUp,
                Action::HalfPageDown,
                Action::HalfPageUp,
                Action::ScrollToTop,
                Action::ScrollToBottom,
            ] {
                app.handle_action(action, 3);
            }
        }
    }

    #[test]
    fn test_goto_panel_out_of_bounds() {
        let mut app = make_app();
        app.handle_action(Action::GoToPanel(99), 1);
        assert_eq!(app.active_panel, Panel::Resolver);
    }

    // ── Tick ──────────────────────────────────────────────────────

    #[test]
    fn test_tick_updates_uptime() {
        let mut app = make_app();
        std::thread::sleep(std::time::Duration::from_millis(10));
        app.tick();
        assert!(app.resolver_panel.uptime.as_millis() > 0);
    }

    #[test]
    fn test_status_line_contains_panel_name() {
        let mut app = make_app();
        assert!(app.status_line().contains("[Resolver]"));
        app.handle_action(Action::NextPanel, 1);
        assert!(app.status_line().contains("[History]"));
    }
}
