//! `census` — terminal UI for the Census person registry.
//!
//! # Usage
//!
//! ```
//! census --url http://localhost:5000
//! census --config ~/.config/census/config.toml
//! ```

mod app;
mod client;
mod form;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
  },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;

const DEFAULT_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "census", about = "Terminal UI for the Census person registry")]
struct Args {
  /// Path to a TOML config file (url, timeout_ms).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the census server (default: http://localhost:5000).
  #[arg(long, env = "CENSUS_URL")]
  url: Option<String>,

  /// Request timeout in milliseconds (default: 10000).
  #[arg(long, env = "CENSUS_TIMEOUT_MS")]
  timeout_ms: Option<u64>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
struct ConfigFile {
  #[serde(default)]
  url:        Option<String>,
  #[serde(default)]
  timeout_ms: Option<u64>,
}

/// CLI flags override the config file, which overrides defaults.
fn resolve(args: Args, file_cfg: ConfigFile) -> ApiConfig {
  ApiConfig {
    base_url: args
      .url
      .or(file_cfg.url)
      .filter(|u| !u.is_empty())
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    timeout:  Duration::from_millis(
      args
        .timeout_ms
        .or(file_cfg.timeout_ms)
        .unwrap_or(DEFAULT_TIMEOUT_MS),
    ),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(resolve(args, file_cfg))?;
  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // A failed first load stays on the status bar; `r` retries.
  let _ = app.load_persons().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    // Windows reports releases too; only act on presses.
    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
