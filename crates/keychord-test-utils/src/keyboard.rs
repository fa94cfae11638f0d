//! Keyboard test helpers.
//!
//! Helpers for driving a [`KeySequenceResolver`] with key scripts in tests,
//! with a recording handler and optional on-disk config files.

use std::path::PathBuf;

use keychord_config::AppConfig;
use keychord_core::script::{self, EventRecord};
use keychord_core::{BindingForest, Invocations, KeySequenceResolver, ResolverOptions, ScriptSource};
use tempfile::TempDir;

/// A resolver over a scripted keyboard that records every invocation.
pub struct TestKeyboard {
    pub resolver: KeySequenceResolver<Invocations, ScriptSource>,
}

impl TestKeyboard {
    /// Build a keyboard from a full config (keymap and resolver options).
    pub fn from_config(config: &AppConfig) -> Self {
        let forest =
            BindingForest::from_config(&config.keymap).expect("test keymap should be valid");
        Self::with_forest(forest, ResolverOptions::from(&config.resolver))
    }

    /// Build a keyboard from a keymap written as TOML, with default options.
    pub fn from_keymap(toml: &str) -> Self {
        let forest = BindingForest::parse(toml).expect("test keymap should parse");
        Self::with_forest(forest, ResolverOptions::default())
    }

    pub fn with_forest(forest: BindingForest, options: ResolverOptions) -> Self {
        Self {
            resolver: KeySequenceResolver::new(
                Invocations::default(),
                ScriptSource::new(),
                forest,
                options,
            ),
        }
    }

    /// Play a key script (see [`keychord_core::script`]) and return what
    /// happened to each delivered event.
    pub fn type_keys(&mut self, keys: &str) -> Vec<EventRecord> {
        let actions = script::parse(keys).expect("test key script should parse");
        script::play(&mut self.resolver, &actions)
    }

    /// Every `(command, count)` invoked so far.
    pub fn commands(&self) -> Vec<(String, u32)> {
        self.resolver
            .handler()
            .pairs()
            .into_iter()
            .map(|(command, count)| (command.to_string(), count))
            .collect()
    }

    /// Like [`commands`](Self::commands), but forgets them afterwards.
    pub fn take_commands(&mut self) -> Vec<(String, u32)> {
        let commands = self.commands();
        self.resolver.handler_mut().clear();
        commands
    }

    pub fn is_idle(&self) -> bool {
        self.resolver.is_idle()
    }
}

/// A test-scoped keyboard with an owned temp directory for its config file.
///
/// The temp directory is deleted automatically when this value is dropped,
/// guaranteeing cleanup even on panic.
pub struct TestSession {
    pub config: AppConfig,
    pub keyboard: TestKeyboard,
    pub config_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestSession {
    /// Create a keyboard backed by a temporary config file containing the
    /// given TOML string.
    pub async fn with_toml(toml_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("keychord.toml");
        tokio::fs::write(&config_path, toml_content)
            .await
            .expect("failed to write test config");

        let config = AppConfig::load(&config_path)
            .await
            .expect("failed to parse test config");
        let keyboard = TestKeyboard::from_config(&config);

        Self {
            config,
            keyboard,
            config_path,
            _temp_dir: temp_dir,
        }
    }

    /// Create a keyboard with the default config (the demo keymap).
    pub async fn default_config() -> Self {
        Self::with_toml("").await
    }

    /// Overwrite the config file and rebuild the keyboard from it.
    ///
    /// Commands recorded so far are discarded along with the old resolver.
    pub async fn rewrite_config(&mut self, toml_content: &str) {
        tokio::fs::write(&self.config_path, toml_content)
            .await
            .expect("failed to write updated config");
        self.config = AppConfig::load(&self.config_path)
            .await
            .expect("failed to parse updated config");
        self.keyboard = TestKeyboard::from_config(&self.config);
    }
}
