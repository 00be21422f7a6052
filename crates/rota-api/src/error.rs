//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use rota_core::{permission::Denial, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(#[from] Denial),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store failure. Domain conflicts become 409, anything else
  /// is an internal error.
  pub fn store<E: StoreError>(error: E) -> Self {
    match error.as_core() {
      Some(core) => Self::from(core.clone()),
      None => Self::Store(Box::new(error)),
    }
  }

  pub fn not_found(kind: &str, id: i64) -> Self { Self::NotFound(format!("{kind} {id} not found")) }
}

impl From<rota_core::Error> for ApiError {
  fn from(error: rota_core::Error) -> Self {
    use rota_core::Error::*;
    match error {
      UsernameTaken(_) | DepartmentNameTaken(_) | AlreadyReviewed { .. } | UserHasReferences(_) => {
        Self::Conflict(error.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_owned()),
      ApiError::Forbidden(d) => (StatusCode::FORBIDDEN, d.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"rota\""),
      );
    }
    res
  }
}
