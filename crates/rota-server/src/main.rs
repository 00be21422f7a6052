//! rota server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured store, seeds it on first start, and serves the JSON API.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use rota_api::AppState;
use rota_core::{permission::PermissionTable, store::RosterStore};
use rota_server::{
  Backend, ServerConfig, app,
  bootstrap::bootstrap,
  config::expand_tilde,
};
use rota_store_memory::MemoryStore;
use rota_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rota staff scheduling server")]
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  match server_cfg.backend {
    Backend::Memory => {
      tracing::warn!("using the in-memory store; data is lost on exit");
      serve(MemoryStore::new(), &server_cfg).await
    }
    Backend::Sqlite => {
      let store_path = expand_tilde(&server_cfg.store_path);
      if let Some(parent) = store_path.parent() {
        tokio::fs::create_dir_all(parent)
          .await
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: RosterStore + 'static,
{
  bootstrap(&store, server_cfg)
    .await
    .context("failed to seed store")?;

  let state = AppState::new(Arc::new(store), PermissionTable::standard());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(state)).await.context("server error")?;

  Ok(())
}
