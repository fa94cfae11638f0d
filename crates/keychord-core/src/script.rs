//! A scripted keyboard host.
//!
//! Turns a short textual key script into the key-down / key-press / key-up
//! stream a real host would deliver, applying the same delivery rules: no
//! key-press after a suppressed key-down, and the key-up of an aborting
//! escape is swallowed by the host. Used by `keychord replay`, the fuzz
//! targets and the test helpers.
//!
//! Script syntax, whitespace separated:
//!
//! | token      | meaning                                                |
//! |------------|--------------------------------------------------------|
//! | `gg`, `23j`| tap each character in turn                             |
//! | `+g`       | key-down and key-press of `g` only (key still held)    |
//! | `-g`       | key-up of `g` only                                     |
//! | `!g`       | tap `g` as a key whose character is known at key-down  |
//! | `<esc>`    | tap escape                                             |
//! | `<blur>`   | the host loses focus                                   |
//! | `<space>`  | tap the space bar                                      |
//! | `<lt>`     | tap `<`                                                |

use std::fmt;

use serde::Serialize;

use crate::platform::{CommandHandler, EventResult, KeyEventSource};
use crate::resolver::KeySequenceResolver;

const ESCAPE_CODE: u32 = 0x1b;

/// Errors from parsing a key script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("unknown special key {0:?}")]
    UnknownSpecial(String),

    #[error("{0:?} must be followed by exactly one character")]
    BadModifier(String),
}

/// Which of the three key events this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Down,
    Press,
    Up,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Phase::Down => "keydown",
            Phase::Press => "keypress",
            Phase::Up => "keyup",
        })
    }
}

/// The physical key behind a scripted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKey {
    /// A printable key; its character is only certain at key-press.
    Char(char),
    /// A key whose character is already certain at key-down.
    Certain(char),
    Escape,
}

impl ScriptKey {
    fn code(self) -> u32 {
        match self {
            ScriptKey::Char(c) | ScriptKey::Certain(c) => c as u32,
            ScriptKey::Escape => ESCAPE_CODE,
        }
    }
}

impl fmt::Display for ScriptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptKey::Char(' ') | ScriptKey::Certain(' ') => f.write_str("<space>"),
            ScriptKey::Char(c) => write!(f, "{c}"),
            ScriptKey::Certain(c) => write!(f, "!{c}"),
            ScriptKey::Escape => f.write_str("<esc>"),
        }
    }
}

/// One step of a parsed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    /// Down, press (unless the down was suppressed), up.
    Tap(ScriptKey),
    /// Down and press only.
    Hold(ScriptKey),
    /// Up only.
    Release(ScriptKey),
    Blur,
}

/// Parse a key script into actions.
pub fn parse(script: &str) -> Result<Vec<ScriptAction>, ScriptError> {
    let mut actions = Vec::new();
    for token in script.split_whitespace() {
        if let Some(name) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            actions.push(match name {
                "esc" => ScriptAction::Tap(ScriptKey::Escape),
                "blur" => ScriptAction::Blur,
                "space" => ScriptAction::Tap(ScriptKey::Char(' ')),
                "lt" => ScriptAction::Tap(ScriptKey::Char('<')),
                other => return Err(ScriptError::UnknownSpecial(other.to_string())),
            });
            continue;
        }

        let mut chars = token.chars();
        let Some(first) = chars.next() else { continue };
        let rest = chars.as_str();
        if matches!(first, '+' | '-' | '!') && !rest.is_empty() {
            let mut rest_chars = rest.chars();
            let (Some(c), None) = (rest_chars.next(), rest_chars.next()) else {
                return Err(ScriptError::BadModifier(token.to_string()));
            };
            actions.push(match first {
                '+' => ScriptAction::Hold(ScriptKey::Char(c)),
                '-' => ScriptAction::Release(ScriptKey::Char(c)),
                _ => ScriptAction::Tap(ScriptKey::Certain(c)),
            });
        } else {
            actions.extend(token.chars().map(|c| ScriptAction::Tap(ScriptKey::Char(c))));
        }
    }
    Ok(actions)
}

/// A scripted key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    pub phase: Phase,
    pub key: ScriptKey,
}

/// [`KeyEventSource`] for scripted events.
///
/// Remembers which events the resolver asked to suppress and whether an
/// escape key-up is due to be swallowed.
#[derive(Debug, Default)]
pub struct ScriptSource {
    suppressed: Vec<ScriptEvent>,
    escape_keyup_armed: bool,
}

impl ScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events the resolver stopped from propagating, in order.
    pub fn suppressed_events(&self) -> &[ScriptEvent] {
        &self.suppressed
    }

    pub fn escape_keyup_armed(&self) -> bool {
        self.escape_keyup_armed
    }

    fn take_escape_keyup(&mut self) -> bool {
        std::mem::take(&mut self.escape_keyup_armed)
    }
}

impl KeyEventSource for ScriptSource {
    type Event = ScriptEvent;
    type KeyId = u32;

    fn character(&self, event: &ScriptEvent) -> Option<char> {
        match (event.phase, event.key) {
            (Phase::Press, ScriptKey::Char(c) | ScriptKey::Certain(c)) => Some(c),
            (Phase::Down, ScriptKey::Certain(c)) => Some(c),
            _ => None,
        }
    }

    fn keydown_character(&self, event: &ScriptEvent) -> Option<char> {
        match event.key {
            ScriptKey::Char(c) | ScriptKey::Certain(c) => Some(c),
            ScriptKey::Escape => None,
        }
    }

    fn is_escape(&self, event: &ScriptEvent) -> bool {
        event.key == ScriptKey::Escape
    }

    fn key_id(&self, event: &ScriptEvent) -> u32 {
        event.key.code()
    }

    fn suppress_propagation(&mut self, event: &ScriptEvent) {
        self.suppressed.push(*event);
    }

    fn suppress_keyup_after_escape(&mut self) {
        self.escape_keyup_armed = true;
    }
}

/// What happened to one delivered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub phase: Phase,
    pub key: String,
    pub result: EventResult,
}

/// A resolved chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub command: String,
    pub count: u32,
}

/// Command handler that just records what it was asked to do.
#[derive(Debug, Default)]
pub struct Invocations(pub Vec<Invocation>);

impl Invocations {
    /// Invocations as `(command, count)` pairs.
    pub fn pairs(&self) -> Vec<(&str, u32)> {
        self.0.iter().map(|i| (i.command.as_str(), i.count)).collect()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl CommandHandler for Invocations {
    fn handle(&mut self, command: &str, count: u32) {
        self.0.push(Invocation {
            command: command.to_string(),
            count,
        });
    }
}

/// Deliver every action to the resolver, returning a record per event.
pub fn play<H: CommandHandler>(
    resolver: &mut KeySequenceResolver<H, ScriptSource>,
    actions: &[ScriptAction],
) -> Vec<EventRecord> {
    let mut records = Vec::new();
    for action in actions {
        match *action {
            ScriptAction::Tap(key) => {
                if deliver_down(resolver, key, &mut records).allows_keypress() {
                    deliver(resolver, Phase::Press, key, &mut records);
                }
                deliver_up(resolver, key, &mut records);
            }
            ScriptAction::Hold(key) => {
                if deliver_down(resolver, key, &mut records).allows_keypress() {
                    deliver(resolver, Phase::Press, key, &mut records);
                }
            }
            ScriptAction::Release(key) => deliver_up(resolver, key, &mut records),
            ScriptAction::Blur => resolver.on_focus_lost(),
        }
    }
    records
}

fn deliver_down<H: CommandHandler>(
    resolver: &mut KeySequenceResolver<H, ScriptSource>,
    key: ScriptKey,
    records: &mut Vec<EventRecord>,
) -> EventResult {
    deliver(resolver, Phase::Down, key, records)
}

fn deliver_up<H: CommandHandler>(
    resolver: &mut KeySequenceResolver<H, ScriptSource>,
    key: ScriptKey,
    records: &mut Vec<EventRecord>,
) {
    if key == ScriptKey::Escape && resolver.source_mut().take_escape_keyup() {
        records.push(EventRecord {
            phase: Phase::Up,
            key: key.to_string(),
            result: EventResult::Suppress,
        });
        return;
    }
    deliver(resolver, Phase::Up, key, records);
}

fn deliver<H: CommandHandler>(
    resolver: &mut KeySequenceResolver<H, ScriptSource>,
    phase: Phase,
    key: ScriptKey,
    records: &mut Vec<EventRecord>,
) -> EventResult {
    let event = ScriptEvent { phase, key };
    let result = match phase {
        Phase::Down => resolver.on_keydown(&event),
        Phase::Press => resolver.on_keypress(&event),
        Phase::Up => resolver.on_keyup(&event),
    };
    records.push(EventRecord {
        phase,
        key: key.to_string(),
        result,
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::BindingForest;
    use crate::resolver::ResolverOptions;
    use pretty_assertions::assert_eq;

    fn resolver(keymap: &str) -> KeySequenceResolver<Invocations, ScriptSource> {
        KeySequenceResolver::new(
            Invocations::default(),
            ScriptSource::new(),
            BindingForest::parse(keymap).unwrap(),
            ResolverOptions::default(),
        )
    }

    #[test]
    fn test_parse_plain_tokens_tap_each_char() {
        let actions = parse("2 gg").unwrap();
        assert_eq!(
            actions,
            vec![
                ScriptAction::Tap(ScriptKey::Char('2')),
                ScriptAction::Tap(ScriptKey::Char('g')),
                ScriptAction::Tap(ScriptKey::Char('g')),
            ]
        );
    }

    #[test]
    fn test_parse_specials_and_modifiers() {
        let actions = parse("<esc> <blur> <space> <lt> +a -a !b + -").unwrap();
        assert_eq!(
            actions,
            vec![
                ScriptAction::Tap(ScriptKey::Escape),
                ScriptAction::Blur,
                ScriptAction::Tap(ScriptKey::Char(' ')),
                ScriptAction::Tap(ScriptKey::Char('<')),
                ScriptAction::Hold(ScriptKey::Char('a')),
                ScriptAction::Release(ScriptKey::Char('a')),
                ScriptAction::Tap(ScriptKey::Certain('b')),
                ScriptAction::Tap(ScriptKey::Char('+')),
                ScriptAction::Tap(ScriptKey::Char('-')),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("<tab>"),
            Err(ScriptError::UnknownSpecial("tab".to_string()))
        );
        assert_eq!(parse("+ab"), Err(ScriptError::BadModifier("+ab".to_string())));
    }

    #[test]
    fn test_play_tap_records_three_events() {
        let mut r = resolver(r#"j = "down""#);
        let records = play(&mut r, &parse("j").unwrap());
        let results: Vec<(Phase, EventResult)> =
            records.iter().map(|rec| (rec.phase, rec.result)).collect();
        assert_eq!(
            results,
            vec![
                (Phase::Down, EventResult::StopBubbling),
                (Phase::Press, EventResult::Suppress),
                (Phase::Up, EventResult::StopBubbling),
            ]
        );
        assert_eq!(r.handler().pairs(), vec![("down", 1)]);
        assert_eq!(r.source().suppressed_events().len(), 2);
    }

    #[test]
    fn test_certain_key_skips_keypress() {
        let mut r = resolver(r#"j = "down""#);
        let records = play(&mut r, &parse("!j").unwrap());
        let phases: Vec<Phase> = records.iter().map(|rec| rec.phase).collect();
        assert_eq!(phases, vec![Phase::Down, Phase::Up]);
        assert_eq!(records[0].result, EventResult::Suppress);
        assert_eq!(records[1].result, EventResult::Continue);
    }

    #[test]
    fn test_host_swallows_escape_keyup_after_abort() {
        let mut r = resolver("[g]\ng = \"top\"");
        let records = play(&mut r, &parse("g <esc>").unwrap());
        let escape: Vec<&EventRecord> = records.iter().filter(|rec| rec.key == "<esc>").collect();
        assert_eq!(escape.len(), 2);
        assert_eq!(escape[0].result, EventResult::Suppress);
        assert_eq!(escape[1].result, EventResult::Suppress);
        assert!(!r.source().escape_keyup_armed());
    }

    #[test]
    fn test_escape_while_idle_passes_through() {
        let mut r = resolver(r#"j = "down""#);
        let records = play(&mut r, &parse("<esc>").unwrap());
        assert!(records.iter().all(|rec| rec.result == EventResult::Continue));
    }

    #[test]
    fn test_blur_between_hold_and_release() {
        let mut r = resolver("[g]\ng = \"top\"");
        let records = play(&mut r, &parse("+g <blur> -g").unwrap());
        assert_eq!(records.last().map(|rec| rec.result), Some(EventResult::Continue));

        let mut r = resolver("[g]\ng = \"top\"");
        let records = play(&mut r, &parse("+g -g").unwrap());
        assert_eq!(
            records.last().map(|rec| rec.result),
            Some(EventResult::StopBubbling)
        );
    }
}
