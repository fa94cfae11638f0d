#![deny(unsafe_code)]

//! keychord TUI: an interactive terminal host for the key sequence resolver.

mod app;
mod host;
mod panels;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use keychord_config::AppConfig;
use keychord_core::LogCollector;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs},
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::app::{ALL_PANELS, App, Panel};

/// Interactive terminal host for keychord.
#[derive(Parser)]
#[command(name = "keychord-tui", version = keychord_core::build_info::LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "keychord.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        AppConfig::load(&cli.config)
            .await
            .with_context(|| format!("failed to load {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    // The terminal belongs to the UI, so logs only go to the collector.
    let collector = LogCollector::new(2000);
    let log_reader = collector.reader();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(collector)
        .init();

    let releases = supports_keyboard_enhancement().unwrap_or(false);
    let mut app = App::new(&config, log_reader, releases).context("invalid keymap")?;
    info!(
        config = %cli.config.display(),
        releases,
        "Starting keychord TUI"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableFocusChange)?;
    if releases {
        stdout.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, &mut app);

    if releases {
        io::stdout().execute(PopKeyboardEnhancementFlags)?;
    }
    io::stdout().execute(DisableFocusChange)?;
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.tick();
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(&key),
                Event::FocusLost => app.focus_lost(),
                _ => {}
            }
        }
    }
    Ok(())
}

fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header + tabs
            Constraint::Min(1),    // main content
            Constraint::Length(2), // status bar
        ])
        .split(frame.area());

    let titles: Vec<&str> = ALL_PANELS.iter().map(|p| p.title()).collect();
    let tabs = Tabs::new(titles)
        .select(app.active_panel.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .title(format!(
                    " keychord {} ",
                    keychord_core::build_info::VERSION
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(tabs, chunks[0]);

    match app.active_panel {
        Panel::Resolver => app.resolver_panel.render(frame, chunks[1]),
        Panel::History => app.history.render(frame, chunks[1]),
        Panel::Bindings => app.bindings.render(frame, chunks[1]),
        Panel::Logs => app.logs.render(frame, chunks[1]),
    }

    let status = Paragraph::new(app.status_line())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, chunks[2]);
}
