//! Pulse server binary.
//!
//! Reads `pulse.toml` (or the path given with `--config`), opens the SQLite
//! entity store, optionally imports a JSON snapshot into it, and serves the
//! analytics API over HTTP.
//!
//! ```text
//! pulse --config pulse.toml --import seed.json
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use pulse_core::{Engine, store::Snapshot};
use pulse_server::{ServerConfig, expand_tilde, router};
use pulse_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pulse multi-location analytics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pulse.toml")]
  config: PathBuf,

  /// Upsert a JSON snapshot (`{"locations":[..],"reviews":[..],"kpis":[..]}`)
  /// into the store before serving.
  #[arg(long, value_name = "SNAPSHOT_JSON")]
  import: Option<PathBuf>,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let engine = Engine::new(server_cfg.engine.clone()).context("invalid [engine] configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(path) = cli.import {
    let raw = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read snapshot {path:?}"))?;
    let snapshot = Snapshot::from_json(&raw)
      .with_context(|| format!("failed to parse snapshot {path:?}"))?;
    store
      .import_snapshot(snapshot)
      .await
      .with_context(|| format!("failed to import snapshot {path:?}"))?;
  }

  let app = router(Arc::new(store), engine);
  let address = server_cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
