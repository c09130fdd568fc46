//! Push delivery for Gatehouse.
//!
//! [`Dispatcher`] implements [`gatehouse_core::notify::Notifier`]: each
//! dispatch is spawned onto the tokio runtime, split into provider-sized
//! batches, and settled independently. Delivery failures end up in the log
//! and nowhere else.

pub mod dispatcher;
pub mod error;
pub mod expo;
pub mod log;
pub mod provider;

pub use dispatcher::{DeliveryReport, Dispatcher, redact_token};
pub use error::{DeliveryError, Result};
pub use provider::{Provider, ProviderKind, PushConfig, PushProvider, PushTicket};
