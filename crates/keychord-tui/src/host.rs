//! Terminal key host.
//!
//! Crossterm reports a key as a single press (and, on terminals with the
//! keyboard enhancement protocol, a later release). The resolver wants the
//! three-phase key-down / key-press / key-up stream, so [`TerminalHost`]
//! splits each press into a key-down and, unless that was suppressed, a
//! key-press. When the terminal cannot report releases the key-up is
//! synthesised right away.
//!
//! Commands resolved by the resolver are mapped to [`Action`]s here too.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keychord_core::script::Phase;
use keychord_core::{
    EventResult, Invocation, Invocations, KeyEventSource, KeySequenceResolver,
};
use tracing::{debug, trace};

/// An action the TUI can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPanel,
    PrevPanel,
    /// Jump to a panel by zero-based index.
    GoToPanel(usize),
    ScrollDown,
    ScrollUp,
    HalfPageDown,
    HalfPageUp,
    ScrollToTop,
    ScrollToBottom,
    ClearHistory,
}

impl Action {
    /// The action a command name stands for, if the TUI knows it.
    pub fn from_command(command: &str) -> Option<Action> {
        Some(match command {
            "quit" => Action::Quit,
            "next-panel" => Action::NextPanel,
            "prev-panel" => Action::PrevPanel,
            "scroll-down" => Action::ScrollDown,
            "scroll-up" => Action::ScrollUp,
            "half-page-down" => Action::HalfPageDown,
            "half-page-up" => Action::HalfPageUp,
            "scroll-to-top" => Action::ScrollToTop,
            "scroll-to-bottom" => Action::ScrollToBottom,
            "clear-history" => Action::ClearHistory,
            other => {
                let n = other.strip_prefix("panel-")?.parse::<usize>().ok()?;
                Action::GoToPanel(n.checked_sub(1)?)
            }
        })
    }

    /// Keys the TUI handles itself when the resolver lets them through.
    pub fn fallback(key: &KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Tab => Some(Action::NextPanel),
            KeyCode::BackTab => Some(Action::PrevPanel),
            KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::PageDown => Some(Action::HalfPageDown),
            KeyCode::PageUp => Some(Action::HalfPageUp),
            KeyCode::Home => Some(Action::ScrollToTop),
            KeyCode::End => Some(Action::ScrollToBottom),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            _ => None,
        }
    }
}

/// One phase of a terminal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermKey {
    pub phase: Phase,
    pub code: KeyCode,
}

/// [`KeyEventSource`] over crossterm key codes.
#[derive(Debug, Default)]
pub struct TerminalKeys {
    suppressed: u64,
    escape_keyup_armed: bool,
}

impl TerminalKeys {
    /// How many events the resolver has kept from the TUI so far.
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }
}

impl KeyEventSource for TerminalKeys {
    type Event = TermKey;
    type KeyId = KeyCode;

    fn character(&self, event: &TermKey) -> Option<char> {
        match (event.phase, event.code) {
            (Phase::Press, KeyCode::Char(c)) => Some(c),
            _ => None,
        }
    }

    fn keydown_character(&self, event: &TermKey) -> Option<char> {
        match event.code {
            KeyCode::Char(c) => Some(c),
            _ => None,
        }
    }

    fn is_escape(&self, event: &TermKey) -> bool {
        event.code == KeyCode::Esc
    }

    fn key_id(&self, event: &TermKey) -> KeyCode {
        event.code
    }

    fn suppress_propagation(&mut self, _event: &TermKey) {
        self.suppressed += 1;
    }

    fn suppress_keyup_after_escape(&mut self) {
        self.escape_keyup_armed = true;
    }
}

/// Drives a resolver from crossterm key events.
pub struct TerminalHost {
    pub resolver: KeySequenceResolver<Invocations, TerminalKeys>,
    /// Whether the terminal reports key releases.
    releases: bool,
}

impl TerminalHost {
    pub fn new(resolver: KeySequenceResolver<Invocations, TerminalKeys>, releases: bool) -> Self {
        Self { resolver, releases }
    }

    /// Deliver a crossterm key event. Returns whether the TUI should still
    /// handle the key itself.
    pub fn key(&mut self, key: &KeyEvent) -> bool {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                let through = self.press(key.code);
                if !self.releases {
                    self.release(key.code);
                }
                through
            }
            KeyEventKind::Release => {
                self.release(key.code);
                false
            }
        }
    }

    pub fn focus_lost(&mut self) {
        self.resolver.on_focus_lost();
    }

    /// Commands resolved since the last call.
    pub fn take_invocations(&mut self) -> Vec<Invocation> {
        std::mem::take(&mut self.resolver.handler_mut().0)
    }

    fn press(&mut self, code: KeyCode) -> bool {
        let down = self.resolver.on_keydown(&TermKey {
            phase: Phase::Down,
            code,
        });
        trace!(?code, %down, "key-down");
        if !down.allows_keypress() {
            return false;
        }
        let press = self.resolver.on_keypress(&TermKey {
            phase: Phase::Press,
            code,
        });
        trace!(?code, %press, "key-press");
        !down.stops_propagation() && !press.stops_propagation()
    }

    fn release(&mut self, code: KeyCode) {
        if code == KeyCode::Esc && std::mem::take(&mut self.resolver.source_mut().escape_keyup_armed)
        {
            debug!("Dropped escape key-up after abort");
            return;
        }
        let up: EventResult = self.resolver.on_keyup(&TermKey {
            phase: Phase::Up,
            code,
        });
        trace!(?code, %up, "key-up");
    }
}
