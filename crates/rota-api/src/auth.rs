//! HTTP Basic authentication.
//!
//! [`CurrentUser`] is an extractor: a handler that takes it only runs once
//! the `Authorization` header has been resolved to a stored user.

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rota_core::{permission::Capability, rules, store::RosterStore, user::User};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AppState, error::ApiError};

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Pull `(username, password)` out of a `Basic` authorization header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((username.to_owned(), password.to_owned()))
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: RosterStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) = basic_credentials(&parts.headers)?;
    let user = rules::login(&*state.store, &username, &password)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| {
        debug!(%username, "rejected credentials");
        ApiError::Unauthorized
      })?;
    Ok(CurrentUser(user))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login`: check credentials without a session.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<User>, ApiError>
where
  S: RosterStore + 'static,
{
  let user = rules::login(&*state.store, &body.username, &body.password)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;
  info!(user_id = user.id, "login");
  Ok(Json(user))
}

#[derive(Debug, Serialize)]
pub struct Me {
  #[serde(flatten)]
  pub user:         User,
  pub capabilities: Vec<Capability>,
}

/// `GET /me`: the caller and everything their role allows.
pub async fn me<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Json<Me>
where
  S: RosterStore + 'static,
{
  let capabilities = state.permissions.capabilities(user.role);
  Json(Me { user, capabilities })
}
