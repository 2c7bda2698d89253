//! census-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite person store, and serves the JSON API under `/api`.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::http::HeaderValue;
use census_core::service::PersonService;
use census_store_sqlite::SqliteStore;
use clap::Parser;
use mockable::DefaultClock;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Census person registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  // Open SQLite store.
  let store = if server_cfg.in_memory() {
    tracing::warn!("using an in-memory store; records are lost on exit");
    SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?
  } else {
    let store_path = expand_tilde(&server_cfg.store_path);
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?
  };

  let service = Arc::new(PersonService::new(store, DefaultClock));
  let mut app = census_api::router(service).layer(TraceLayer::new_for_http());
  if let Some(cors) = cors_layer(&server_cfg.cors_origins)? {
    app = app.layer(cors);
  }

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// A permissive-method CORS layer for the configured origins, if any.
fn cors_layer(origins: &[String]) -> anyhow::Result<Option<CorsLayer>> {
  if origins.is_empty() {
    return Ok(None);
  }
  let origins = origins
    .iter()
    .map(|o| {
      HeaderValue::from_str(o)
        .with_context(|| format!("invalid CORS origin {o:?}"))
    })
    .collect::<anyhow::Result<Vec<_>>>()?;

  Ok(Some(
    CorsLayer::new()
      .allow_origin(origins)
      .allow_methods(tower_http::cors::Any)
      .allow_headers(tower_http::cors::Any)
      .expose_headers([axum::http::header::LOCATION]),
  ))
}
