//! Handlers for `/announcements` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/announcements` | Body: `{"title", "message", "target"}`; returns `{count, announcement}` |
//! | `GET`  | `/announcements/{role}` | Targeted at `role` or `all`, newest first |

use axum::{
  Json,
  extract::{Path, State},
};
use gatehouse_core::{
  announcement::{Announcement, AnnouncementRequest},
  broadcast::Broadcast,
  notify::Notifier,
  store::GateStore,
};

use crate::{AppState, error::ApiError, extract::JsonBody};

/// `POST /announcements`
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  JsonBody(body): JsonBody<AnnouncementRequest>,
) -> Result<Json<Broadcast>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.broadcaster.create(body).await?))
}

/// `GET /announcements/{role}`
pub async fn list_for_role<S, N>(
  State(state): State<AppState<S, N>>,
  Path(role): Path<String>,
) -> Result<Json<Vec<Announcement>>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.broadcaster.list_for_role(&role).await?))
}
