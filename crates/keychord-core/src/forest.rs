//! The binding forest: an immutable tree of key characters leading to
//! command identifiers.
//!
//! Nodes are shared through [`Arc`] so the resolver can hold on to any
//! sub-mapping (and re-append the root after every key) without copying or
//! mutating the tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use keychord_config::{KeymapConfig, KeymapNode};

/// Opaque command identifier, cheap to clone.
pub type CommandId = Arc<str>;

/// Errors raised while building a [`BindingForest`].
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    #[error("failed to parse keymap: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{path}: keys must be exactly one character, got {key:?}")]
    InvalidKey { path: String, key: String },

    #[error("{path}: chord prefix must bind at least one key")]
    EmptyPrefix { path: String },

    #[error("{path}: command name must not be empty")]
    EmptyCommand { path: String },
}

/// A node in the forest: either another mapping or a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Mapping(Arc<KeyMap>),
    Command(CommandId),
}

impl Binding {
    /// The command this node resolves to, if it is a leaf.
    pub fn as_command(&self) -> Option<&CommandId> {
        match self {
            Binding::Command(id) => Some(id),
            Binding::Mapping(_) => None,
        }
    }

    /// The sub-mapping this node opens, if it is a prefix.
    pub fn as_mapping(&self) -> Option<&Arc<KeyMap>> {
        match self {
            Binding::Mapping(map) => Some(map),
            Binding::Command(_) => None,
        }
    }
}

/// A single level of the forest, keyed by one character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    entries: HashMap<char, Binding>,
}

impl KeyMap {
    pub fn get(&self, key: char) -> Option<&Binding> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: char) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Binding)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// The full set of chords the resolver knows about.
///
/// Cloning a forest clones a handle to the same immutable root.
#[derive(Debug, Clone)]
pub struct BindingForest {
    root: Arc<KeyMap>,
}

impl BindingForest {
    /// A forest with nothing bound.
    pub fn empty() -> Self {
        Self {
            root: Arc::new(KeyMap::default()),
        }
    }

    /// Build a forest from a validated-or-not keymap tree.
    ///
    /// Malformed trees are rejected here rather than tolerated at run time.
    pub fn from_config(config: &KeymapConfig) -> Result<Self, ForestError> {
        let root = convert_table(&config.root, "keymap")?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Parse a forest from a TOML document whose top-level table is the
    /// keymap root.
    pub fn parse(s: &str) -> Result<Self, ForestError> {
        let config: KeymapConfig = toml::from_str(s)?;
        Self::from_config(&config)
    }

    /// Shared handle to the root mapping.
    pub fn root(&self) -> &Arc<KeyMap> {
        &self.root
    }

    /// Every complete chord paired with its command, sorted by chord.
    pub fn bindings(&self) -> Vec<(String, CommandId)> {
        let mut out = Vec::new();
        collect_bindings(&self.root, &mut String::new(), &mut out);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Look up the command bound to an exact chord, if any.
    pub fn lookup(&self, chord: &str) -> Option<CommandId> {
        let mut map = &self.root;
        let mut keys = chord.chars().peekable();
        while let Some(key) = keys.next() {
            match (map.get(key)?, keys.peek()) {
                (Binding::Command(id), None) => return Some(id.clone()),
                (Binding::Mapping(next), Some(_)) => map = next,
                _ => return None,
            }
        }
        None
    }
}

impl Default for BindingForest {
    fn default() -> Self {
        Self::empty()
    }
}

fn convert_table(
    table: &BTreeMap<String, KeymapNode>,
    path: &str,
) -> Result<KeyMap, ForestError> {
    let mut entries = HashMap::with_capacity(table.len());
    for (key, node) in table {
        let child = format!("{path}.{key}");
        let mut chars = key.chars();
        let key_char = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ForestError::InvalidKey {
                    path: child,
                    key: key.clone(),
                });
            }
        };
        let binding = match node {
            KeymapNode::Command(name) if name.trim().is_empty() => {
                return Err(ForestError::EmptyCommand { path: child });
            }
            KeymapNode::Command(name) => Binding::Command(Arc::from(name.as_str())),
            KeymapNode::Table(inner) if inner.is_empty() => {
                return Err(ForestError::EmptyPrefix { path: child });
            }
            KeymapNode::Table(inner) => Binding::Mapping(Arc::new(convert_table(inner, &child)?)),
        };
        entries.insert(key_char, binding);
    }
    Ok(KeyMap { entries })
}

fn collect_bindings(map: &KeyMap, chord: &mut String, out: &mut Vec<(String, CommandId)>) {
    for (key, binding) in map.iter() {
        chord.push(key);
        match binding {
            Binding::Command(id) => out.push((chord.clone(), id.clone())),
            Binding::Mapping(next) => collect_bindings(next, chord, out),
        }
        chord.pop();
    }
}
