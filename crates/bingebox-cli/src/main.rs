//! `bingebox`, a terminal client for browsing movies through the BingeBox
//! relay, with local ratings, favorites and comments.
//!
//! # Usage
//!
//! ```text
//! bingebox --relay-url http://localhost:5000
//! bingebox --config ~/.config/bingebox/config.toml
//! bingebox --ephemeral
//! ```

mod app;
mod client;
mod store;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use bingebox_core::{book::AnnotationBook, store::MemoryStore};
use bingebox_store_sqlite::SqliteStore;
use clap::Parser;
use client::RelayClient;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use store::LocalStore;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::level_filters::LevelFilter;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::EnvFilter;

const DEFAULT_RELAY_URL: &str = "http://localhost:5000";
const DEFAULT_DATA_DIR: &str = "~/.local/share/bingebox";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bingebox", about = "Terminal client for the BingeBox movie relay")]
struct Args {
  /// Path to a TOML config file (relay_url, data_dir).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the relay (default: http://localhost:5000).
  #[arg(long, env = "BINGEBOX_RELAY_URL")]
  relay_url: Option<String>,

  /// Directory holding the annotation database and the log file
  /// (default: ~/.local/share/bingebox).
  #[arg(long, env = "BINGEBOX_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// Keep annotations in memory only; nothing is written to disk.
  #[arg(long)]
  ephemeral: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  relay_url: Option<String>,
  #[serde(default)]
  data_dir:  Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let relay_url = args
    .relay_url
    .or(file_cfg.relay_url)
    .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
  let data_dir = expand_tilde(
    &args
      .data_dir
      .or(file_cfg.data_dir)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
  );

  std::fs::create_dir_all(&data_dir)
    .with_context(|| format!("creating data directory {}", data_dir.display()))?;
  // Dropping the guard flushes buffered log lines; hold it until exit.
  let _log_guard = init_tracing(&data_dir);
  tracing::info!(
    relay_url = %relay_url,
    data_dir = %data_dir.display(),
    ephemeral = args.ephemeral,
    "starting"
  );

  let store = if args.ephemeral {
    LocalStore::Memory(MemoryStore::new())
  } else {
    let path = data_dir.join("annotations.db");
    LocalStore::Sqlite(
      SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?,
    )
  };
  let book = AnnotationBook::open(Arc::new(store))
    .await
    .context("loading annotations")?;

  let client = RelayClient::new(relay_url)?;
  let (tx, rx) = mpsc::unbounded_channel();
  let mut app = App::new(client, book, tx);
  app.start();

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app, rx).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Log to `<data_dir>/bingebox.log`; the terminal belongs to the UI.
fn init_tracing(data_dir: &Path) -> WorkerGuard {
  let (writer, guard) =
    tracing_appender::non_blocking(rolling::never(data_dir, "bingebox.log"));

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(writer)
    .init();
  guard
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  mut rx: UnboundedReceiver<app::Outcome>,
) -> Result<()> {
  loop {
    // Fold in whatever fetches finished since the last frame.
    while let Ok(outcome) = rx.try_recv() {
      app.apply(outcome);
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}
