//! JSON REST API for Gatehouse.
//!
//! Exposes an axum [`Router`] backed by any [`gatehouse_core::store::GateStore`]
//! and any [`gatehouse_core::notify::Notifier`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(gatehouse_api::api_router(AppState::new(store, notifier)))
//! ```

pub mod announcements;
pub mod error;
pub mod extract;
pub mod flats;
pub mod users;
pub mod visitors;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use gatehouse_core::{
  broadcast::Broadcaster, directory::Directory, notify::Notifier,
  registry::VisitorRegistry, store::GateStore,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Every service holds the same
/// store handle and notifier.
pub struct AppState<S, N> {
  pub registry:    Arc<VisitorRegistry<S, N>>,
  pub broadcaster: Arc<Broadcaster<S, N>>,
  pub directory:   Directory<S>,
}

impl<S, N> Clone for AppState<S, N> {
  fn clone(&self) -> Self {
    Self {
      registry:    self.registry.clone(),
      broadcaster: self.broadcaster.clone(),
      directory:   self.directory.clone(),
    }
  }
}

impl<S: GateStore, N: Notifier> AppState<S, N> {
  pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
    Self {
      registry:    Arc::new(VisitorRegistry::new(store.clone(), notifier.clone())),
      broadcaster: Arc::new(Broadcaster::new(store.clone(), notifier)),
      directory:   Directory::new(store),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(state: AppState<S, N>) -> Router<()>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    // Visitors
    .route("/visitors", get(visitors::list::<S, N>).post(visitors::create::<S, N>))
    .route("/visitors/retarget", put(visitors::retarget::<S, N>))
    .route(
      "/visitors/status",
      put(visitors::update_status::<S, N>).patch(visitors::update_status_legacy::<S, N>),
    )
    .route("/visitors/flat/{flat}", get(visitors::list_by_flat::<S, N>))
    .route("/visitors/{id}", get(visitors::get_one::<S, N>))
    // Directory
    .route(
      "/users/push-token",
      put(users::register_token::<S, N>).post(users::register_token_legacy::<S, N>),
    )
    .route("/users/logout", post(users::logout::<S, N>))
    .route("/flats/{flat}/contact", get(flats::contact::<S, N>))
    .route("/flats/{flat}/members", get(flats::members::<S, N>))
    // Announcements
    .route("/announcements", post(announcements::create::<S, N>))
    .route("/announcements/{role}", get(announcements::list_for_role::<S, N>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
