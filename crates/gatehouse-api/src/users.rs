//! Handlers for device-token endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/users/push-token` | Body: `{"userId", "token"}` |
//! | `POST` | `/users/push-token` | Deprecated alias of `PUT` |
//! | `POST` | `/users/logout` | Body: `{"userId"}`; clears the token |

use axum::{Json, extract::State};
use gatehouse_core::{
  notify::Notifier,
  store::GateStore,
  user::{LogoutRequest, PushTokenRequest},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::JsonBody};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAck {
  pub user_id:    Uuid,
  pub registered: bool,
}

fn parse_user_id(raw: Option<String>) -> Result<Uuid, ApiError> {
  let raw = raw
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest("userId is required".into()))?;
  Uuid::parse_str(&raw).map_err(|_| ApiError::BadRequest(format!("invalid userId {raw:?}")))
}

/// `PUT /users/push-token`
pub async fn register_token<S, N>(
  State(state): State<AppState<S, N>>,
  JsonBody(body): JsonBody<PushTokenRequest>,
) -> Result<Json<TokenAck>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  let user_id = parse_user_id(body.user_id)?;
  let token = body
    .token
    .ok_or_else(|| ApiError::BadRequest("token is required".into()))?;
  state.directory.set_push_token(user_id, Some(token)).await?;
  Ok(Json(TokenAck { user_id, registered: true }))
}

/// `POST /users/push-token`: older clients; same behaviour as `PUT`.
pub async fn register_token_legacy<S, N>(
  state: State<AppState<S, N>>,
  body: JsonBody<PushTokenRequest>,
) -> Result<Json<TokenAck>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  tracing::warn!("POST /users/push-token is deprecated; use PUT");
  register_token(state, body).await
}

/// `POST /users/logout`
pub async fn logout<S, N>(
  State(state): State<AppState<S, N>>,
  JsonBody(body): JsonBody<LogoutRequest>,
) -> Result<Json<TokenAck>, ApiError>
where
  S: GateStore + 'static,
  N: Notifier + 'static,
{
  let user_id = parse_user_id(body.user_id)?;
  state.directory.set_push_token(user_id, None).await?;
  Ok(Json(TokenAck { user_id, registered: false }))
}
