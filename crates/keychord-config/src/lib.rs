#![deny(unsafe_code)]

//! Configuration loading and validation for keychord.
//!
//! Loads TOML configuration files and validates them before anything is
//! built from them. Provides the [`AppConfig`] type as the central
//! configuration structure, and the [`keymap`] module describing the
//! binding tree as written by the user.

/// Keymap tree as written in TOML.
pub mod keymap;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use keymap::{KeymapConfig, KeymapNode};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Key sequence resolver options.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// The binding tree. Replaces the built-in demo keymap when present.
    #[serde(default)]
    pub keymap: KeymapConfig,
}

/// Options for the key sequence resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Whether digits typed before a chord are collected as a repeat count.
    /// When disabled, digits are ordinary keys.
    #[serde(default = "default_count_prefix")]
    pub count_prefix: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            count_prefix: default_count_prefix(),
        }
    }
}

fn default_count_prefix() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            root_bindings = config.keymap.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        self.keymap.validate()
    }
}
