//! [`Dispatcher`]: batches and fans out one message over a [`PushProvider`].

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use gatehouse_core::notify::{Notifier, PushMessage};
use tokio::task::JoinSet;

use crate::provider::{PushProvider, PushTicket};

/// What happened to one dispatch. Only ever logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
  /// Tokens handed in, before any filtering.
  pub requested:      usize,
  /// Tokens dropped by the provider's format check.
  pub invalid:        usize,
  pub batches:        usize,
  pub failed_batches: usize,
  /// Recipients in batches that failed outright, panics included.
  pub undelivered:    usize,
  /// Recipients the provider accepted.
  pub accepted:       usize,
  /// Recipients the provider refused individually.
  pub refused:        usize,
}

/// Fans a message out over `P` in provider-sized batches.
///
/// Cloning is cheap; the provider is reference-counted.
pub struct Dispatcher<P> {
  provider: Arc<P>,
}

impl<P> Clone for Dispatcher<P> {
  fn clone(&self) -> Self { Self { provider: self.provider.clone() } }
}

impl<P: PushProvider> Dispatcher<P> {
  pub fn new(provider: P) -> Self { Self { provider: Arc::new(provider) } }

  pub fn provider(&self) -> &P { &self.provider }

  /// Deliver `message` to every token and wait for all batches to settle.
  ///
  /// Empty tokens are dropped silently; malformed ones are dropped with a
  /// warning. Batches run concurrently and fail independently.
  pub async fn deliver(&self, tokens: Vec<String>, message: PushMessage) -> DeliveryReport {
    let mut report = DeliveryReport { requested: tokens.len(), ..Default::default() };

    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(tokens.len());
    for token in tokens {
      let token = token.trim();
      if token.is_empty() {
        continue;
      }
      if !self.provider.is_valid_token(token) {
        tracing::warn!(
          provider = self.provider.name(),
          token = %redact_token(token),
          "skipping malformed push token"
        );
        report.invalid += 1;
        continue;
      }
      if seen.insert(token.to_owned()) {
        valid.push(token.to_owned());
      }
    }

    if valid.is_empty() {
      return report;
    }

    let message = Arc::new(message);
    let batch_size = self.provider.max_batch_size().max(1);
    let mut tasks = JoinSet::new();
    // A panicked task takes its batch with it; remember the sizes by task id.
    let mut sizes = HashMap::new();
    for chunk in valid.chunks(batch_size) {
      let provider = self.provider.clone();
      let message = message.clone();
      let batch = chunk.to_vec();
      let handle = tasks.spawn(async move {
        let outcome = provider.send_batch(&batch, &message).await;
        (batch, outcome)
      });
      sizes.insert(handle.id(), chunk.len());
      report.batches += 1;
    }

    while let Some(joined) = tasks.join_next_with_id().await {
      match joined {
        Ok((_, (batch, Ok(tickets)))) => {
          for (token, ticket) in batch.iter().zip(tickets) {
            match ticket {
              PushTicket::Accepted { .. } => report.accepted += 1,
              PushTicket::Refused { message, code } => {
                report.refused += 1;
                tracing::warn!(
                  provider = self.provider.name(),
                  token = %redact_token(token),
                  code = code.as_deref().unwrap_or("unknown"),
                  %message,
                  "push refused for recipient"
                );
              }
            }
          }
        }
        Ok((_, (batch, Err(error)))) => {
          report.failed_batches += 1;
          report.undelivered += batch.len();
          tracing::warn!(
            provider = self.provider.name(),
            recipients = batch.len(),
            %error,
            "push batch failed"
          );
        }
        Err(error) => {
          let recipients = sizes.get(&error.id()).copied().unwrap_or_default();
          report.failed_batches += 1;
          report.undelivered += recipients;
          tracing::error!(
            provider = self.provider.name(),
            recipients,
            %error,
            "push batch task aborted"
          );
        }
      }
    }

    report
  }
}

/// The tail of a device token, enough to tell tokens apart in logs.
pub fn redact_token(token: &str) -> String {
  let chars: Vec<char> = token.chars().collect();
  if chars.len() <= 8 {
    return "***".to_owned();
  }
  let tail: String = chars[chars.len() - 6..].iter().collect();
  format!("***{tail}")
}

impl<P: PushProvider> Notifier for Dispatcher<P> {
  /// Spawn delivery on the current tokio runtime and return immediately.
  fn dispatch(&self, tokens: Vec<String>, message: PushMessage) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      tracing::error!("no tokio runtime; dropping push notification");
      return;
    };

    let this = self.clone();
    runtime.spawn(async move {
      let title = message.title.clone();
      let report = this.deliver(tokens, message).await;
      tracing::info!(
        provider = this.provider.name(),
        %title,
        requested = report.requested,
        accepted = report.accepted,
        refused = report.refused,
        invalid = report.invalid,
        failed_batches = report.failed_batches,
        "push dispatch settled"
      );
    });
  }
}
