//! Handlers for `/flats/{flat}` lookups. Read-only; nothing is notified.

use axum::{
  Json,
  extract::{Path, State},
};
use gatehouse_core::{
  notify::Notifier,
  store::GateStore,
  user::{FlatMember, ResidentContact},
};

use crate::{AppState, error::ApiError};

/// `GET /flats/{flat}/contact`: who the guard should call. 404 if the flat
/// has no resident.
pub async fn contact<S, N>(
  State(state): State<AppState<S, N>>,
  Path(flat): Path<String>,
) -> Result<Json<ResidentContact>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.directory.contact_for_flat(&flat).await?))
}

/// `GET /flats/{flat}/members`
pub async fn members<S, N>(
  State(state): State<AppState<S, N>>,
  Path(flat): Path<String>,
) -> Result<Json<Vec<FlatMember>>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.directory.members_of_flat(&flat).await?))
}
