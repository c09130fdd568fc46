//! Error types for `gatehouse-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or a value is outside its allowed set.
  /// Raised before any mutation.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("visitor not found: {0}")]
  VisitorNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("no resident registered for flat {0:?}")]
  FlatHasNoResidents(String),

  /// Uniqueness violation on a directory field (e.g. a duplicate phone).
  #[error("conflict: {0}")]
  Conflict(String),

  /// The backing store failed; the operation was aborted.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }

  /// Whether this error means the referenced record does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::VisitorNotFound(_) | Self::UserNotFound(_) | Self::FlatHasNoResidents(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
