//! The seam between committed state changes and push delivery.
//!
//! Services hand a message and a token set to a [`Notifier`] after the store
//! has acknowledged the write. Submission returns immediately; delivery and
//! its failures belong to the notifier.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::user::Recipient;

/// A push payload as seen by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
  pub title: String,
  pub body:  String,
  /// Free-form payload handed to the app alongside the alert.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:  Option<serde_json::Value>,
}

impl PushMessage {
  pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self { title: title.into(), body: body.into(), data: None }
  }

  pub fn with_data(mut self, data: serde_json::Value) -> Self {
    self.data = Some(data);
    self
  }
}

/// Fire-and-forget delivery of one message to a set of device tokens.
///
/// Implementations must not block on delivery and must never surface a
/// delivery failure to the caller.
pub trait Notifier: Send + Sync {
  fn dispatch(&self, tokens: Vec<String>, message: PushMessage);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
  fn dispatch(&self, tokens: Vec<String>, message: PushMessage) {
    (**self).dispatch(tokens, message)
  }
}

/// Drops every message. Used when push delivery is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
  fn dispatch(&self, tokens: Vec<String>, message: PushMessage) {
    tracing::debug!(
      recipients = tokens.len(),
      title = %message.title,
      "push disabled; dropping notification"
    );
  }
}

/// The device tokens of `recipients`; accounts without one are skipped.
pub fn tokens_of(recipients: &[Recipient]) -> Vec<String> {
  recipients
    .iter()
    .filter_map(|r| r.push_token.as_deref())
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn tokens_of_skips_missing_and_empty() {
    let recipients = vec![
      Recipient { id: Uuid::new_v4(), push_token: Some("ExponentPushToken[a]".into()) },
      Recipient { id: Uuid::new_v4(), push_token: None },
      Recipient { id: Uuid::new_v4(), push_token: Some(String::new()) },
    ];
    assert_eq!(tokens_of(&recipients), vec!["ExponentPushToken[a]".to_string()]);
  }
}
