//! Server wiring for Gatehouse: configuration and the top-level router.

use std::path::{Path, PathBuf};

use axum::Router;
use config::{
  Config, ConfigError, Environment, File,
  builder::{ConfigBuilder, DefaultState},
};
use gatehouse_api::{AppState, api_router};
use gatehouse_core::{notify::Notifier, store::GateStore};
use gatehouse_push::PushConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GATEHOUSE_*` environment variables (`GATEHOUSE_PUSH__PROVIDER=log`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub push:       PushConfig,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/gatehouse/gatehouse.db") }

impl ServerConfig {
  /// Load from `path` if it exists, then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .add_source(
        Environment::with_prefix("GATEHOUSE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S, N>(state: AppState<S, N>) -> Router
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::FileFormat;
  use gatehouse_core::notify::NoopNotifier;
  use gatehouse_push::ProviderKind;
  use gatehouse_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.push.provider, ProviderKind::Expo);
    assert_eq!(cfg.push.timeout_secs, 10);
  }

  #[test]
  fn push_table_is_read() {
    let cfg = from_toml(
      r#"
        host = "127.0.0.1"
        port = 9000
        store_path = "/var/lib/gatehouse.db"

        [push]
        provider = "log"
        timeout_secs = 3
      "#,
    );
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.push.provider, ProviderKind::Log);
    assert_eq!(cfg.push.timeout_secs, 3);
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("/var/lib/gatehouse.db"));
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/gate.db")),
      PathBuf::from(home).join("gate.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs.db")), PathBuf::from("/abs.db"));
  }

  #[tokio::test]
  async fn app_serves_the_api() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let app = app(AppState::new(store, Arc::new(NoopNotifier)));
    let resp = app
      .oneshot(Request::builder().uri("/visitors").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
