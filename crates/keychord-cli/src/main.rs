#![deny(unsafe_code)]

//! keychord CLI: check keymaps, list bindings and replay key scripts.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keychord_config::AppConfig;
use keychord_core::script::{self, EventRecord};
use keychord_core::{BindingForest, Invocations, KeySequenceResolver, ResolverOptions, ScriptSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// keychord: resolve key sequences into commands.
#[derive(Parser)]
#[command(name = "keychord", version = keychord_core::build_info::LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "keychord.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and build the binding forest.
    Check,

    /// List every bound chord and its command.
    Bindings {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Feed a key script through the resolver and show what happens.
    ///
    /// Tokens are whitespace separated: `23j` taps 2, 3 and j; `+g` / `-g`
    /// press and release g; `!g` taps a key known at key-down; `<esc>`,
    /// `<blur>`, `<space>` and `<lt>` are special keys.
    Replay {
        /// The key script, e.g. "2 gg <esc> j".
        script: String,

        /// Treat digits as ordinary keys.
        #[arg(long)]
        no_count: bool,

        /// Show every key event, not just invoked commands.
        #[arg(long)]
        events: bool,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },

    /// Show version and build information.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config(&cli.config).await;

    // -v wins over the configured level; RUST_LOG wins over both.
    let filter = match cli.verbose {
        0 => match &loaded {
            Ok(Some(config)) => config.logging.level.clone(),
            _ => "info".to_string(),
        },
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("keychord {}", keychord_core::build_info::version_string());
        return Ok(());
    }

    let config = config_or_default(&cli.config, loaded?);
    let output = match cli.command {
        Commands::Check => cmd_check(&cli.config, &config)?,
        Commands::Bindings { json } => cmd_bindings(&config, json)?,
        Commands::Replay {
            script,
            no_count,
            events,
            json,
        } => cmd_replay(&config, &script, no_count, events, json)?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
        Commands::Version => String::new(),
    };
    print!("{output}");

    Ok(())
}

fn build_forest(config: &AppConfig) -> Result<BindingForest> {
    BindingForest::from_config(&config.keymap).context("invalid keymap")
}

fn cmd_check(config_path: &Path, config: &AppConfig) -> Result<String> {
    let forest = build_forest(config)?;
    Ok(format!(
        "Configuration at '{}' is valid ({} bindings).\n",
        config_path.display(),
        forest.bindings().len()
    ))
}

fn cmd_bindings(config: &AppConfig, json: bool) -> Result<String> {
    let bindings = build_forest(config)?.bindings();

    if json {
        let entries: Vec<serde_json::Value> = bindings
            .iter()
            .map(|(chord, command)| serde_json::json!({ "chord": chord, "command": &**command }))
            .collect();
        return Ok(serde_json::to_string_pretty(&entries)? + "\n");
    }

    let width = bindings
        .iter()
        .map(|(chord, _)| chord.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (chord, command) in &bindings {
        writeln!(out, "{chord:<width$}  {command}")?;
    }
    Ok(out)
}

fn cmd_replay(
    config: &AppConfig,
    keys: &str,
    no_count: bool,
    events: bool,
    json: bool,
) -> Result<String> {
    let actions = script::parse(keys).context("invalid key script")?;
    let mut options = ResolverOptions::from(&config.resolver);
    if no_count {
        options.count_prefix = false;
    }
    let mut resolver = KeySequenceResolver::new(
        Invocations::default(),
        ScriptSource::new(),
        build_forest(config)?,
        options,
    );
    info!(actions = actions.len(), "Replaying key script");

    // Play one action at a time so invocations can be shown where they
    // happened.
    let mut records: Vec<EventRecord> = Vec::new();
    let mut out = String::new();
    for action in &actions {
        let seen = resolver.handler().0.len();
        let step = script::play(&mut resolver, std::slice::from_ref(action));
        if events && !json {
            for record in &step {
                writeln!(out, "{:<9} {:<8} {}", record.phase, record.key, record.result)?;
            }
        }
        if !json {
            for invocation in &resolver.handler().0[seen..] {
                writeln!(out, "=> {} x{}", invocation.command, invocation.count)?;
            }
        }
        records.extend(step);
    }

    if json {
        let report = serde_json::json!({
            "events": records,
            "invocations": resolver.handler().0,
            "pending": resolver.pending_chord(),
            "count": resolver.count_prefix(),
        });
        return Ok(serde_json::to_string_pretty(&report)? + "\n");
    }

    if !resolver.is_idle() {
        writeln!(
            out,
            "pending: count {} keys {:?}",
            resolver.count_prefix(),
            resolver.pending_chord()
        )?;
    }
    Ok(out)
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<String> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        Ok(format!("{toml_str}\n"))
    } else {
        Ok(format!(
            "Configuration at '{}' is valid.\n",
            config_path.display()
        ))
    }
}

/// Load the config file, or `None` when there is no file at `path`.
async fn load_config(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    AppConfig::load(path)
        .await
        .map(Some)
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Runs after the subscriber is installed so the fallback is logged.
fn config_or_default(path: &Path, loaded: Option<AppConfig>) -> AppConfig {
    loaded.unwrap_or_else(|| {
        info!(path = %path.display(), "Config file not found, using defaults");
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use keychord_test_utils::TestConfigBuilder;
    use keychord_test_utils::tracing_setup::capture_logs;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config() -> AppConfig {
        TestConfigBuilder::new()
            .bind("j", "down")
            .bind("gg", "top")
            .bind("gt", "next-tab")
            .build()
    }

    #[test]
    fn test_cli_parses_replay() {
        let cli = Cli::parse_from(["keychord", "-vv", "replay", "--no-count", "2j"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("keychord.toml"));
        let Commands::Replay {
            script, no_count, ..
        } = cli.command
        else {
            panic!("expected replay");
        };
        assert_eq!(script, "2j");
        assert!(no_count);
    }

    #[test]
    fn test_bindings_table_is_aligned_and_sorted() {
        let out = cmd_bindings(&config(), false).unwrap();
        assert_eq!(out, "gg  top\ngt  next-tab\nj   down\n");
    }

    #[test]
    fn test_bindings_json() {
        let out = cmd_bindings(&config(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["chord"], "gg");
        assert_eq!(value[2]["command"], "down");
    }

    #[test_log::test]
    fn test_replay_lists_invocations() {
        let out = cmd_replay(&config(), "3j gg g", false, false, false).unwrap();
        assert_eq!(out, "=> down x3\n=> top x1\npending: count 0 keys \"g\"\n");
    }

    #[test_log::test]
    fn test_replay_no_count() {
        let out = cmd_replay(&config(), "3j", true, false, false).unwrap();
        assert_eq!(out, "=> down x1\n");
    }

    #[test_log::test]
    fn test_replay_events() {
        let out = cmd_replay(&config(), "j", false, true, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("keydown"));
        assert!(lines[0].ends_with("stop-bubbling"));
        assert!(lines[1].ends_with("suppress"));
        assert_eq!(lines[3], "=> down x1");
    }

    #[test_log::test]
    fn test_replay_json() {
        let out = cmd_replay(&config(), "2 g <esc>", false, false, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["invocations"], serde_json::json!([]));
        assert_eq!(value["pending"], "");
        assert_eq!(value["count"], 0);
        let last = value["events"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["phase"], "up");
        assert_eq!(last["key"], "<esc>");
        assert_eq!(last["result"], "suppress");
    }

    #[test]
    fn test_replay_rejects_bad_script() {
        let err = cmd_replay(&config(), "<tab>", false, false, false).unwrap_err();
        assert!(err.to_string().contains("invalid key script"));
    }

    #[test]
    fn test_check_counts_bindings() {
        let out = cmd_check(Path::new("keychord.toml"), &config()).unwrap();
        assert_eq!(out, "Configuration at 'keychord.toml' is valid (3 bindings).\n");
    }

    #[test]
    fn test_config_show_round_trips() {
        let config = config();
        let out = cmd_config(Path::new("keychord.toml"), &config, true).unwrap();
        let reparsed = AppConfig::parse(&out).unwrap();
        assert_eq!(reparsed.keymap, config.keymap);
    }

    #[tokio::test]
    async fn test_load_config_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = load_config(&path).await.unwrap();
        assert!(loaded.is_none());

        let (config, logs) = capture_logs(|| config_or_default(&path, loaded));
        assert_eq!(config.keymap, AppConfig::default().keymap);
        let entries = logs.entries();
        let fallback = entries
            .iter()
            .find(|e| e.message == "Config file not found, using defaults")
            .expect("fallback should be logged");
        assert_eq!(fallback.field("path"), Some(path.display().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_load_config_reads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keychord.toml");
        tokio::fs::write(&path, "[logging]\nlevel = \"debug\"\n")
            .await
            .unwrap();
        let loaded = load_config(&path).await.unwrap();
        let (config, logs) = capture_logs(|| config_or_default(&path, loaded));
        assert_eq!(config.logging.level, "debug");
        assert!(
            logs.entries()
                .iter()
                .all(|e| e.message != "Config file not found, using defaults")
        );
    }

    #[tokio::test]
    async fn test_load_config_reports_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keychord.toml");
        tokio::fs::write(&path, "[keymap]\njk = \"bad\"\n")
            .await
            .unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("keymap"));
    }
}
