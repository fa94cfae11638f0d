//! Keymap tree as it appears in the `[keymap]` section of the config file.
//!
//! A string value binds a command; a table value opens a chord prefix whose
//! entries continue the sequence:
//!
//! ```toml
//! [keymap]
//! j = "scroll-down"
//!
//! [keymap.g]
//! g = "scroll-to-top"
//! t = "next-panel"
//! ```
//!
//! This module only checks the *shape* of the tree. The runtime forest the
//! resolver walks is built from it by `keychord_core::BindingForest`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One entry in the keymap tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeymapNode {
    /// A completed chord resolving to a command identifier.
    Command(String),
    /// A chord prefix with further entries.
    Table(BTreeMap<String, KeymapNode>),
}

impl KeymapNode {
    /// Shorthand for building a command leaf.
    pub fn command(name: impl Into<String>) -> Self {
        KeymapNode::Command(name.into())
    }

    /// Build a table node from `(key, node)` pairs.
    pub fn table<K: Into<String>>(entries: impl IntoIterator<Item = (K, KeymapNode)>) -> Self {
        KeymapNode::Table(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The root table of the keymap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeymapConfig {
    pub root: BTreeMap<String, KeymapNode>,
}

impl KeymapConfig {
    /// An empty keymap (nothing is bound).
    pub fn empty() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }

    /// Build a keymap from `(key, node)` pairs at the root.
    pub fn from_entries<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, KeymapNode)>,
    ) -> Self {
        Self {
            root: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Number of root-level entries.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether nothing is bound at the root.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Check the tree shape.
    ///
    /// Every key must be exactly one character, every command name must be
    /// non-empty and nested tables must bind at least one key. The root
    /// itself may be empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_table(&self.root, "keymap")
    }
}

impl Default for KeymapConfig {
    /// The demo keymap used when no `[keymap]` section is configured.
    fn default() -> Self {
        Self::from_entries([
            ("j", KeymapNode::command("scroll-down")),
            ("k", KeymapNode::command("scroll-up")),
            ("d", KeymapNode::command("half-page-down")),
            ("u", KeymapNode::command("half-page-up")),
            ("G", KeymapNode::command("scroll-to-bottom")),
            ("l", KeymapNode::command("next-panel")),
            ("h", KeymapNode::command("prev-panel")),
            ("x", KeymapNode::command("clear-history")),
            ("q", KeymapNode::command("quit")),
            (
                "g",
                KeymapNode::table([
                    ("g", KeymapNode::command("scroll-to-top")),
                    ("t", KeymapNode::command("next-panel")),
                    ("T", KeymapNode::command("prev-panel")),
                ]),
            ),
            (
                "z",
                KeymapNode::table([
                    ("x", KeymapNode::command("clear-history")),
                    ("q", KeymapNode::command("quit")),
                ]),
            ),
        ])
    }
}

fn validate_table(table: &BTreeMap<String, KeymapNode>, path: &str) -> Result<(), ConfigError> {
    for (key, node) in table {
        let child = format!("{path}.{key}");
        if key.chars().count() != 1 {
            return Err(ConfigError::Validation(format!(
                "{child}: keys must be exactly one character, got {key:?}"
            )));
        }
        match node {
            KeymapNode::Command(name) if name.trim().is_empty() => {
                return Err(ConfigError::Validation(format!(
                    "{child}: command name must not be empty"
                )));
            }
            KeymapNode::Command(_) => {}
            KeymapNode::Table(inner) if inner.is_empty() => {
                return Err(ConfigError::Validation(format!(
                    "{child}: chord prefix must bind at least one key"
                )));
            }
            KeymapNode::Table(inner) => validate_table(inner, &child)?,
        }
    }
    Ok(())
}
