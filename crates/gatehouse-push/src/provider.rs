//! The `PushProvider` trait and the runtime-selected [`Provider`].

use std::future::Future;

use gatehouse_core::notify::PushMessage;
use serde::Deserialize;

use crate::{
  DeliveryError, Result,
  expo::{ExpoConfig, ExpoProvider},
  log::LogProvider,
};

/// The provider's verdict on a single message within an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTicket {
  Accepted { id: Option<String> },
  /// The provider refused this recipient (e.g. the device is no longer
  /// registered). `code` is the provider's machine-readable reason.
  Refused { message: String, code: Option<String> },
}

/// A push-notification channel.
///
/// Implementations send one batch per call and report per-recipient tickets
/// in input order. They never retry.
pub trait PushProvider: Send + Sync + 'static {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  /// Largest batch accepted by a single [`PushProvider::send_batch`] call.
  fn max_batch_size(&self) -> usize;

  /// Format check applied before a token is sent.
  fn is_valid_token(&self, token: &str) -> bool;

  fn send_batch<'a>(
    &'a self,
    tokens: &'a [String],
    message: &'a PushMessage,
  ) -> impl Future<Output = Result<Vec<PushTicket>>> + Send + 'a;
}

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
  #[default]
  Expo,
  Log,
}

/// Push settings, deserialised from the `[push]` table of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
  #[serde(default)]
  pub provider:     ProviderKind,
  /// Override for the provider's send endpoint.
  #[serde(default)]
  pub endpoint:     Option<String>,
  #[serde(default)]
  pub access_token: Option<String>,
  /// Per-request timeout; an elapsed timeout counts as a failed batch.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 10 }

impl Default for PushConfig {
  fn default() -> Self {
    Self {
      provider:     ProviderKind::default(),
      endpoint:     None,
      access_token: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

// ─── Provider selection ───────────────────────────────────────────────────────

/// A provider chosen at startup from configuration.
pub enum Provider {
  Expo(ExpoProvider),
  Log(LogProvider),
}

impl Provider {
  pub fn from_config(config: &PushConfig) -> Result<Self> {
    Ok(match config.provider {
      ProviderKind::Expo => Self::Expo(ExpoProvider::new(ExpoConfig::from(config))?),
      ProviderKind::Log => Self::Log(LogProvider),
    })
  }
}

impl PushProvider for Provider {
  fn name(&self) -> &'static str {
    match self {
      Self::Expo(p) => p.name(),
      Self::Log(p) => p.name(),
    }
  }

  fn max_batch_size(&self) -> usize {
    match self {
      Self::Expo(p) => p.max_batch_size(),
      Self::Log(p) => p.max_batch_size(),
    }
  }

  fn is_valid_token(&self, token: &str) -> bool {
    match self {
      Self::Expo(p) => p.is_valid_token(token),
      Self::Log(p) => p.is_valid_token(token),
    }
  }

  async fn send_batch(
    &self,
    tokens: &[String],
    message: &PushMessage,
  ) -> Result<Vec<PushTicket>, DeliveryError> {
    match self {
      Self::Expo(p) => p.send_batch(tokens, message).await,
      Self::Log(p) => p.send_batch(tokens, message).await,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn log_provider_selected_from_config() {
    let config = PushConfig { provider: ProviderKind::Log, ..Default::default() };
    let provider = Provider::from_config(&config).unwrap();
    assert_eq!(provider.name(), "log");
  }

  #[test]
  fn expo_is_the_default() {
    let provider = Provider::from_config(&PushConfig::default()).unwrap();
    assert_eq!(provider.name(), "expo");
    assert!(provider.is_valid_token("ExponentPushToken[abc123]"));
    assert!(!provider.is_valid_token("garbage"));
  }
}
