//! Seams between the resolver and its host: where key events come from,
//! where resolved commands go, and what the host should do with an event
//! afterwards.

use std::fmt::{self, Debug};
use std::hash::Hash;

use serde::Serialize;

/// What the host should do with an event after the resolver has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventResult {
    /// Not ours; pass it on to the next handler.
    Continue,
    /// Stop further handlers from seeing it, but the resolver has not
    /// consumed it as part of a sequence (yet).
    StopBubbling,
    /// Consumed. The host must also cancel the event's default action, which
    /// means no key-press follows a suppressed key-down.
    Suppress,
}

impl EventResult {
    /// Whether later handlers in the host's stack are skipped.
    pub fn stops_propagation(self) -> bool {
        !matches!(self, EventResult::Continue)
    }

    /// Whether the host should still deliver the key-press that follows a
    /// key-down with this result.
    pub fn allows_keypress(self) -> bool {
        !matches!(self, EventResult::Suppress)
    }
}

impl fmt::Display for EventResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            EventResult::Continue => "continue",
            EventResult::StopBubbling => "stop-bubbling",
            EventResult::Suppress => "suppress",
        })
    }
}

/// Host-side knowledge about raw key events.
///
/// A physical key press arrives as three events: key-down, key-press and
/// key-up. `Event` is whatever the host uses to describe any one of them.
pub trait KeyEventSource {
    /// A raw key event of any phase.
    type Event;

    /// Identifies the physical key, used to pair a key-down with its key-up.
    type KeyId: Eq + Hash + Clone + Debug;

    /// The normalised character an event carries.
    ///
    /// Always available on key-press. On key-down it is only available for
    /// keys whose character is already certain, and `None` otherwise.
    fn character(&self, event: &Self::Event) -> Option<char>;

    /// A conservative guess, on key-down, of the character the following
    /// key-press will carry.
    fn keydown_character(&self, event: &Self::Event) -> Option<char>;

    fn is_escape(&self, event: &Self::Event) -> bool;

    fn key_id(&self, event: &Self::Event) -> Self::KeyId;

    /// Stop the event's default behaviour and any further propagation.
    fn suppress_propagation(&mut self, event: &Self::Event);

    /// Swallow the key-up that follows an escape key-down.
    fn suppress_keyup_after_escape(&mut self);
}

/// Receives every resolved chord.
pub trait CommandHandler {
    fn handle(&mut self, command: &str, count: u32);
}

impl<F> CommandHandler for F
where
    F: FnMut(&str, u32),
{
    fn handle(&mut self, command: &str, count: u32) {
        self(command, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_result_propagation() {
        assert!(!EventResult::Continue.stops_propagation());
        assert!(EventResult::StopBubbling.stops_propagation());
        assert!(EventResult::Suppress.stops_propagation());
    }

    #[test]
    fn test_event_result_keypress_delivery() {
        assert!(EventResult::Continue.allows_keypress());
        assert!(EventResult::StopBubbling.allows_keypress());
        assert!(!EventResult::Suppress.allows_keypress());
    }

    #[test]
    fn test_event_result_display_matches_serde() {
        for result in [
            EventResult::Continue,
            EventResult::StopBubbling,
            EventResult::Suppress,
        ] {
            let json = serde_json::to_string(&result).unwrap();
            assert_eq!(json, format!("\"{result}\""));
        }
    }

    #[test]
    fn test_closure_is_a_handler() {
        let mut seen = Vec::new();
        {
            let mut handler = |command: &str, count: u32| seen.push((command.to_string(), count));
            handler.handle("scroll-down", 3);
        }
        assert_eq!(seen, vec![("scroll-down".to_string(), 3)]);
    }
}
