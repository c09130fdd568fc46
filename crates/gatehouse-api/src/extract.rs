//! Request-body extractor that reports malformed JSON as [`ApiError`].

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::ApiError;

/// `axum::Json` for request bodies. A missing content type, unparsable body,
/// or mistyped field becomes a 400 with the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}
