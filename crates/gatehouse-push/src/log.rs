//! A provider that writes each message to the log instead of sending it.
//! Used in development and for deployments without push credentials.

use gatehouse_core::notify::PushMessage;

use crate::{
  Result,
  dispatcher::redact_token,
  provider::{PushProvider, PushTicket},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogProvider;

impl PushProvider for LogProvider {
  fn name(&self) -> &'static str { "log" }

  fn max_batch_size(&self) -> usize { 100 }

  fn is_valid_token(&self, token: &str) -> bool { !token.trim().is_empty() }

  async fn send_batch(
    &self,
    tokens: &[String],
    message: &PushMessage,
  ) -> Result<Vec<PushTicket>> {
    for token in tokens {
      tracing::info!(
        token = %redact_token(token),
        title = %message.title,
        body = %message.body,
        "push (log provider)"
      );
    }
    Ok(vec![PushTicket::Accepted { id: None }; tokens.len()])
  }
}
