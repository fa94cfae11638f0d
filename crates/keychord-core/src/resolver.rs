//! The key sequence resolver: turns a stream of key-down / key-press /
//! key-up events into `(command, count)` pairs.
//!
//! Whether a key belongs to a chord is often only known at key-press time,
//! but the key-down arrives first and must already be kept from the rest of
//! the host. The resolver therefore blocks such key-downs provisionally,
//! remembers them by key id, and swallows the matching key-up as well.

use std::collections::HashSet;

use keychord_config::ResolverConfig;
use tracing::{debug, info, trace, warn};

use crate::count::CountPrefix;
use crate::forest::{BindingForest, CommandId};
use crate::matcher::{MatchState, Step};
use crate::platform::{CommandHandler, EventResult, KeyEventSource};

/// Construction-time options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Collect leading digits as a repeat count. When off, digits are
    /// ordinary keys.
    pub count_prefix: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { count_prefix: true }
    }
}

impl ResolverOptions {
    /// Options with count prefixes turned off.
    pub fn no_count() -> Self {
        Self {
            count_prefix: false,
        }
    }
}

impl From<&ResolverConfig> for ResolverOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            count_prefix: config.count_prefix,
        }
    }
}

/// Resolves key events against a [`BindingForest`].
///
/// One resolver owns one event stream. All state is private to the instance
/// and only changes inside the `on_*` handlers and [`reset`](Self::reset).
pub struct KeySequenceResolver<H, S>
where
    S: KeyEventSource,
{
    handler: H,
    source: S,
    options: ResolverOptions,
    state: MatchState,
    count: CountPrefix,
    suppressed: HashSet<S::KeyId>,
}

impl<H, S> KeySequenceResolver<H, S>
where
    H: CommandHandler,
    S: KeyEventSource,
{
    pub fn new(handler: H, source: S, forest: BindingForest, options: ResolverOptions) -> Self {
        Self {
            handler,
            source,
            options,
            state: MatchState::new(&forest),
            count: CountPrefix::default(),
            suppressed: HashSet::new(),
        }
    }

    /// Handle a key-down event.
    pub fn on_keydown(&mut self, event: &S::Event) -> EventResult {
        if self.source.is_escape(event) {
            if self.is_idle() {
                trace!("Escape while idle, passing through");
                return EventResult::Continue;
            }
            debug!(
                keys = %self.pending_chord(),
                count = self.count.value(),
                "Escape aborted pending sequence"
            );
            self.reset();
            self.source.suppress_keyup_after_escape();
            return EventResult::Suppress;
        }

        if let Some(key) = self.source.character(event) {
            if self.state.is_prefix(key) {
                self.feed(key);
                return EventResult::Suppress;
            }
        }

        match self.source.keydown_character(event) {
            Some(key) if self.state.is_prefix(key) || self.is_count_key(key) => {
                // The key-press will do the matching; keep the key-down from
                // reaching anyone else in the meantime.
                self.source.suppress_propagation(event);
                let id = self.source.key_id(event);
                debug!(key = %key, ?id, "Holding key-down until key-press");
                self.suppressed.insert(id);
                EventResult::StopBubbling
            }
            Some(key) => {
                if !self.count.is_empty() {
                    debug!(key = %key, count = self.count.value(), "Unbound key dropped count");
                }
                self.count.clear();
                EventResult::Continue
            }
            None => EventResult::Continue,
        }
    }

    /// Handle a key-press event.
    pub fn on_keypress(&mut self, event: &S::Event) -> EventResult {
        let Some(key) = self.source.character(event) else {
            return EventResult::Continue;
        };

        if self.state.is_prefix(key) {
            self.feed(key);
            EventResult::Suppress
        } else if self.is_count_key(key) {
            self.count.push(key);
            debug!(count = self.count.value(), "Count prefix");
            EventResult::Suppress
        } else {
            trace!(key = %key, "Key-press not bound");
            EventResult::Continue
        }
    }

    /// Handle a key-up event.
    pub fn on_keyup(&mut self, event: &S::Event) -> EventResult {
        let id = self.source.key_id(event);
        if self.suppressed.remove(&id) {
            self.source.suppress_propagation(event);
            trace!(?id, "Swallowed key-up of held key-down");
            EventResult::StopBubbling
        } else {
            EventResult::Continue
        }
    }

    /// The host lost focus; key-ups can no longer be paired reliably, so
    /// stop waiting for them.
    pub fn on_focus_lost(&mut self) {
        if !self.suppressed.is_empty() {
            warn!(
                pending = self.suppressed.len(),
                "Focus lost, releasing held key-downs"
            );
        }
        self.suppressed.clear();
    }

    /// Abandon any partial chord and count.
    pub fn reset(&mut self) {
        self.count.clear();
        self.state.reset();
    }

    /// No partial chord and no count pending.
    pub fn is_idle(&self) -> bool {
        self.state.is_at_root() && self.count.is_empty()
    }

    /// The count typed so far (0 when none).
    pub fn count_prefix(&self) -> u32 {
        self.count.value()
    }

    /// Keys of the chord in progress.
    pub fn pending_keys(&self) -> &[char] {
        self.state.keys()
    }

    /// Keys of the chord in progress as a string.
    pub fn pending_chord(&self) -> String {
        self.state.keys().iter().collect()
    }

    /// Number of candidate mappings in the match state.
    pub fn match_depth(&self) -> usize {
        self.state.len()
    }

    /// Number of key-downs held back whose key-up has not arrived.
    pub fn pending_suppressed(&self) -> usize {
        self.suppressed.len()
    }

    pub fn is_holding(&self, id: &S::KeyId) -> bool {
        self.suppressed.contains(id)
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn is_count_key(&self, key: char) -> bool {
        self.options.count_prefix && self.count.accepts(key)
    }

    fn feed(&mut self, key: char) {
        match self.state.advance(key) {
            Step::Complete(command) => self.invoke(command),
            Step::Pending => {
                debug!(keys = %self.pending_chord(), depth = self.state.len(), "Chord pending");
            }
        }
    }

    fn invoke(&mut self, command: CommandId) {
        let count = self.count.effective();
        self.reset();
        info!(command = %command, count, "Invoking command");
        self.handler.handle(&command, count);
    }
}
