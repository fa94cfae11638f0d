#![deny(unsafe_code)]

//! keychord core: resolves key events into named commands.
//!
//! A [`KeySequenceResolver`] walks a [`BindingForest`] one key at a time,
//! supporting single keys, multi-key chords (`gg`), numeric count prefixes
//! (`23j`) and the key-down / key-press / key-up coordination a host needs to
//! keep consumed keys from leaking to other handlers.

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Numeric repeat-count prefix.
pub mod count;
/// Immutable binding forest built from a keymap tree.
pub mod forest;
/// In-memory log collector for the TUI.
pub mod logging;
/// Candidate-set walk over the forest.
pub mod matcher;
/// Host-facing traits and the event result type.
pub mod platform;
/// The event coordinator tying the pieces together.
pub mod resolver;
/// Scripted keyboard host for replays, fuzzing and tests.
pub mod script;

pub use count::CountPrefix;
pub use forest::{Binding, BindingForest, CommandId, ForestError, KeyMap};
pub use logging::{LogCollector, LogEntry, LogReader};
pub use matcher::{MatchState, Step};
pub use platform::{CommandHandler, EventResult, KeyEventSource};
pub use resolver::{KeySequenceResolver, ResolverOptions};
pub use script::{Invocation, Invocations, ScriptSource};
