//! Error type for `gatehouse-push`.
//!
//! These errors never leave the dispatcher; they exist to be logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
  /// Transport failure, including the client timeout elapsing.
  #[error("push request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("push provider answered {status}: {body}")]
  Status { status: u16, body: String },

  #[error("push provider rejected the request: {0}")]
  Rejected(String),

  #[error("unexpected push provider response: {0}")]
  Decode(String),
}

pub type Result<T, E = DeliveryError> = std::result::Result<T, E>;
