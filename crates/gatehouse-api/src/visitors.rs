//! Handlers for `/visitors` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/visitors` | Body: [`NewVisitorRequest`]; returns 201 + stored visitor |
//! | `GET`   | `/visitors` | Newest arrival first |
//! | `GET`   | `/visitors/{id}` | 404 if not found |
//! | `GET`   | `/visitors/flat/{flat}` | Visitors bound to one flat |
//! | `PUT`   | `/visitors/retarget` | Body: `{"id", "targetFlat", "purpose"}` |
//! | `PUT`   | `/visitors/status` | Body: `{"id", "status"}` |
//! | `PATCH` | `/visitors/status` | Deprecated alias of `PUT` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  notify::Notifier,
  store::GateStore,
  visitor::{NewVisitorRequest, RetargetRequest, StatusRequest, Visitor},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::JsonBody};

/// `POST /visitors`: the record is returned as soon as it is stored;
/// resident notification happens in the background.
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  JsonBody(body): JsonBody<NewVisitorRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  let visitor = state.registry.create(body).await?;
  Ok((StatusCode::CREATED, Json(visitor)))
}

/// `GET /visitors`
pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.registry.list_all().await?))
}

/// `GET /visitors/flat/{flat}`
pub async fn list_by_flat<S, N>(
  State(state): State<AppState<S, N>>,
  Path(flat): Path<String>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.registry.list_by_flat(&flat).await?))
}

/// `GET /visitors/{id}`
pub async fn get_one<S, N>(
  State(state): State<AppState<S, N>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Visitor>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.registry.get(id).await?))
}

/// `PUT /visitors/retarget`
pub async fn retarget<S, N>(
  State(state): State<AppState<S, N>>,
  JsonBody(body): JsonBody<RetargetRequest>,
) -> Result<Json<Visitor>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.registry.retarget(body).await?))
}

/// `PUT /visitors/status`: body `{"id": "...", "status": "approved"|"rejected"}`.
pub async fn update_status<S, N>(
  State(state): State<AppState<S, N>>,
  JsonBody(body): JsonBody<StatusRequest>,
) -> Result<Json<Visitor>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  Ok(Json(state.registry.update_status(body).await?))
}

/// `PATCH /visitors/status`: older clients; same behaviour as `PUT`.
pub async fn update_status_legacy<S, N>(
  state: State<AppState<S, N>>,
  body: JsonBody<StatusRequest>,
) -> Result<Json<Visitor>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  tracing::warn!("PATCH /visitors/status is deprecated; use PUT");
  update_status(state, body).await
}
