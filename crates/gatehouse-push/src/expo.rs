//! Expo push service provider.
//!
//! Messages are POSTed as a JSON array to the Expo send endpoint. A 2xx
//! response carries one ticket per message, in order; a ticket with
//! `"status": "error"` is a per-recipient refusal.

use std::time::Duration;

use gatehouse_core::notify::PushMessage;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  DeliveryError, Result,
  provider::{PushConfig, PushProvider, PushTicket},
};

pub const DEFAULT_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

/// Expo rejects requests with more than 100 messages.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct ExpoConfig {
  pub endpoint:     String,
  pub access_token: Option<String>,
  pub timeout:      Duration,
}

impl From<&PushConfig> for ExpoConfig {
  fn from(c: &PushConfig) -> Self {
    Self {
      endpoint:     c.endpoint.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
      access_token: c.access_token.clone().filter(|t| !t.is_empty()),
      timeout:      Duration::from_secs(c.timeout_secs),
    }
  }
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ExpoProvider {
  client: Client,
  config: ExpoConfig,
}

impl ExpoProvider {
  pub fn new(config: ExpoConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }
}

/// `ExponentPushToken[…]`, `ExpoPushToken[…]`, or a bare device UUID.
pub fn is_expo_push_token(token: &str) -> bool {
  let bracketed = ["ExponentPushToken[", "ExpoPushToken["].iter().any(|prefix| {
    token
      .strip_prefix(prefix)
      .and_then(|rest| rest.strip_suffix(']'))
      .is_some_and(|inner| !inner.is_empty())
  });
  bracketed || (token.len() == 36 && Uuid::try_parse(token).is_ok())
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExpoMessage<'a> {
  to:       &'a str,
  title:    &'a str,
  body:     &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  data:     Option<&'a serde_json::Value>,
  sound:    &'static str,
  priority: &'static str,
}

#[derive(Deserialize)]
struct ExpoResponse {
  #[serde(default)]
  data:   Vec<ExpoTicket>,
  #[serde(default)]
  errors: Vec<ExpoRequestError>,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ExpoTicket {
  Ok {
    id: Option<String>,
  },
  Error {
    message: String,
    #[serde(default)]
    details: Option<ExpoTicketDetails>,
  },
}

#[derive(Deserialize)]
struct ExpoTicketDetails {
  error: Option<String>,
}

#[derive(Deserialize)]
struct ExpoRequestError {
  #[serde(default)]
  code:    Option<String>,
  message: String,
}

impl From<ExpoTicket> for PushTicket {
  fn from(t: ExpoTicket) -> Self {
    match t {
      ExpoTicket::Ok { id } => PushTicket::Accepted { id },
      ExpoTicket::Error { message, details } => PushTicket::Refused {
        message,
        code: details.and_then(|d| d.error),
      },
    }
  }
}

// ─── PushProvider impl ────────────────────────────────────────────────────────

impl PushProvider for ExpoProvider {
  fn name(&self) -> &'static str { "expo" }

  fn max_batch_size(&self) -> usize { MAX_BATCH_SIZE }

  fn is_valid_token(&self, token: &str) -> bool { is_expo_push_token(token) }

  async fn send_batch(
    &self,
    tokens: &[String],
    message: &PushMessage,
  ) -> Result<Vec<PushTicket>> {
    let messages: Vec<ExpoMessage<'_>> = tokens
      .iter()
      .map(|to| ExpoMessage {
        to,
        title: &message.title,
        body: &message.body,
        data: message.data.as_ref(),
        sound: "default",
        priority: "high",
      })
      .collect();

    let mut request = self
      .client
      .post(&self.config.endpoint)
      .header(header::ACCEPT, "application/json")
      .json(&messages);
    if let Some(token) = &self.config.access_token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(DeliveryError::Status { status: status.as_u16(), body });
    }

    let parsed: ExpoResponse = response
      .json()
      .await
      .map_err(|e| DeliveryError::Decode(e.to_string()))?;

    if !parsed.errors.is_empty() {
      let reasons: Vec<String> = parsed
        .errors
        .into_iter()
        .map(|e| match e.code {
          Some(code) => format!("{code}: {}", e.message),
          None => e.message,
        })
        .collect();
      return Err(DeliveryError::Rejected(reasons.join("; ")));
    }

    if parsed.data.len() != tokens.len() {
      return Err(DeliveryError::Decode(format!(
        "expected {} tickets, got {}",
        tokens.len(),
        parsed.data.len()
      )));
    }

    Ok(parsed.data.into_iter().map(PushTicket::from).collect())
  }
}
