//! bingebox-relay server binary.
//!
//! Reads `relay.toml` (or the path given with `--config`), layers the
//! environment on top, and relays catalog queries over HTTP. The upstream
//! access token is normally supplied as `TMDB_ACCESS_TOKEN`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use bingebox_relay::{RelayConfig, TmdbClient};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "BingeBox catalog relay")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "relay.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = RelayConfig::load(&cli.config, std::env::vars())
    .context("failed to load relay configuration (is TMDB_ACCESS_TOKEN set?)")?;

  let catalog = TmdbClient::from_config(&config).context("failed to build upstream client")?;
  let app = bingebox_relay::router(Arc::new(catalog));

  let address = config.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
