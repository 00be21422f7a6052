//! Handlers for `/users` endpoints.
//!
//! | Method   | Path          | Capability   | Notes |
//! |----------|---------------|--------------|-------|
//! | `GET`    | `/users`      | `viewUsers`  | |
//! | `POST`   | `/users`      | `createUser` | 201; 409 on a taken username |
//! | `GET`    | `/users/:id`  | `viewUsers`  | 404 if not found |
//! | `PATCH`  | `/users/:id`  | `editUser`   | changing `role` also needs `createUser` |
//! | `DELETE` | `/users/:id`  | `deleteUser` | 204; 409 while the user owns shifts or time off |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  permission::Capability,
  rules::{self, Outcome},
  store::RosterStore,
  user::{NewUser, User, UserId, UserPatch},
};
use tracing::info;

use crate::{AppState, CurrentUser, error::ApiError, validate};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewUsers, None)?;
  let users = state.store.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /users`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::CreateUser, None)?;
  validate::new_user(&body)?;

  let outcome = rules::create_user(&*state.store, Some(actor.id), body)
    .await
    .map_err(ApiError::store)?;
  info!(actor = actor.id, id = outcome.value.id, "user created");
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewUsers, None)?;
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("user", id))?;
  Ok(Json(user))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /users/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<UserId>,
  Json(patch): Json<UserPatch>,
) -> Result<Json<Outcome<User>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::EditUser, None)?;
  // Roles, and another user's credentials, stay with account creators.
  let touches_credentials = patch.username.is_some() || patch.password.is_some();
  if patch.role.is_some() || (touches_credentials && id != actor.id) {
    state.authorize(&actor, Capability::CreateUser, None)?;
  }
  validate::user_patch(&patch)?;

  let outcome = rules::update_user(&*state.store, Some(actor.id), id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("user", id))?;
  info!(actor = actor.id, id, "user updated");
  Ok(Json(outcome))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::DeleteUser, None)?;
  rules::delete_user(&*state.store, Some(actor.id), id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("user", id))?;
  info!(actor = actor.id, id, "user deleted");
  Ok(StatusCode::NO_CONTENT)
}
