//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use std::collections::BTreeMap;

use keychord_config::{AppConfig, KeymapConfig, KeymapNode};

/// Fluent builder for [`AppConfig`] in tests.
///
/// Starts from an empty keymap rather than the built-in demo bindings, so a
/// test only sees the chords it binds.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .bind("j", "down")
///     .bind("gg", "top")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig {
                keymap: KeymapConfig::empty(),
                ..AppConfig::default()
            },
        }
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn count_prefix(mut self, enabled: bool) -> Self {
        self.config.resolver.count_prefix = enabled;
        self
    }

    /// Replace the whole keymap.
    pub fn keymap(mut self, keymap: KeymapConfig) -> Self {
        self.config.keymap = keymap;
        self
    }

    /// Bind `chord` (one key per character) to `command`, creating nested
    /// tables along the way.
    ///
    /// Binding a chord through a key that is already bound to a command
    /// replaces that command with a table.
    pub fn bind(mut self, chord: &str, command: &str) -> Self {
        let keys: Vec<String> = chord.chars().map(String::from).collect();
        insert_chord(&mut self.config.keymap.root, &keys, command);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_chord(table: &mut BTreeMap<String, KeymapNode>, keys: &[String], command: &str) {
    match keys {
        [] => {}
        [last] => {
            table.insert(last.clone(), KeymapNode::command(command));
        }
        [first, rest @ ..] => {
            let node = table
                .entry(first.clone())
                .or_insert_with(|| KeymapNode::Table(BTreeMap::new()));
            if matches!(node, KeymapNode::Command(_)) {
                *node = KeymapNode::Table(BTreeMap::new());
            }
            if let KeymapNode::Table(next) = node {
                insert_chord(next, rest, command);
            }
        }
    }
}
