//! gatehouse server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the gate API over HTTP.
//!
//! # Provisioning accounts
//!
//! The directory is read-only over HTTP. To seed residents and guards:
//!
//! ```sh
//! cargo run -p gatehouse-server -- add-user --phone 9000000001 --name Asha --role resident --flat A-101
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gatehouse_api::AppState;
use gatehouse_core::{
  directory::Directory,
  user::{NewUser, Role},
};
use gatehouse_push::{Dispatcher, Provider};
use gatehouse_server::ServerConfig;
use gatehouse_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gatehouse visitor and announcement server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Add a guard, resident, or admin account to the directory and exit.
  AddUser {
    #[arg(long)]
    phone: String,
    #[arg(long)]
    name:  String,
    #[arg(long)]
    role:  Role,
    /// Required for residents.
    #[arg(long)]
    flat:  Option<String>,
  },
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

  let server_cfg =
    ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(server_cfg, store).await,
    Command::AddUser { phone, name, role, flat } => {
      let user = Directory::new(store)
        .add_user(NewUser { phone, name, role, flat_number: flat })
        .await
        .context("failed to add user")?;
      println!("{}", serde_json::to_string_pretty(&user)?);
      Ok(())
    }
  }
}

async fn serve(server_cfg: ServerConfig, store: Arc<SqliteStore>) -> anyhow::Result<()> {
  let provider =
    Provider::from_config(&server_cfg.push).context("failed to set up push provider")?;
  tracing::info!(provider = ?server_cfg.push.provider, "push delivery configured");
  let notifier = Arc::new(Dispatcher::new(provider));

  let app = gatehouse_server::app(AppState::new(store, notifier));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
