//! Handlers for `/shifts` endpoints.
//!
//! | Method   | Path          | Capability    | Notes |
//! |----------|---------------|---------------|-------|
//! | `GET`    | `/shifts`     | `viewShifts`  | Optional `?userId`, `from`, `to` (inclusive dates) |
//! | `POST`   | `/shifts`     | `createShift` | Body: shift fields plus `"notify": bool` |
//! | `GET`    | `/shifts/:id` | `viewShifts`  | |
//! | `PATCH`  | `/shifts/:id` | `editShift`   | Owners holding `editOwnShift` may edit their own shift |
//! | `DELETE` | `/shifts/:id` | `deleteShift` | `?notify=true` to tell the owner |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rota_core::{
  permission::{Capability, Denial},
  rules::{self, Outcome},
  shift::{NewShift, Shift, ShiftId, ShiftPatch, ShiftQuery},
  store::RosterStore,
  user::UserId,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, CurrentUser, error::ApiError, validate};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub user_id: Option<UserId>,
  pub from:    Option<NaiveDate>,
  pub to:      Option<NaiveDate>,
}

/// `GET /shifts[?userId=<id>][&from=<date>][&to=<date>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Shift>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewShifts, None)?;
  let query = ShiftQuery { user_id: params.user_id, from: params.from, to: params.to };
  let shifts = state.store.list_shifts(query).await.map_err(ApiError::store)?;
  Ok(Json(shifts))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(flatten)]
  pub shift:  NewShift,
  #[serde(default)]
  pub notify: bool,
}

/// `POST /shifts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::CreateShift, None)?;
  validate::shift_window(body.shift.start_time, body.shift.end_time)?;
  validate::non_empty("department", &body.shift.department)?;

  let outcome = rules::create_shift(&*state.store, Some(actor.id), body.shift, body.notify)
    .await
    .map_err(ApiError::store)?;
  info!(actor = actor.id, id = outcome.value.id, notify = body.notify, "shift created");
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /shifts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<ShiftId>,
) -> Result<Json<Shift>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewShifts, None)?;
  let shift = state
    .store
    .get_shift(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("shift", id))?;
  Ok(Json(shift))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(flatten)]
  pub patch:  ShiftPatch,
  #[serde(default)]
  pub notify: bool,
}

/// `PATCH /shifts/:id`
///
/// The shift is read before authorization so the own-shift rule can see its
/// owner, but a missing shift is only reported once the caller has passed
/// the check. Callers who rely on the own-shift rule may not hand the shift
/// to someone else.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<ShiftId>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Outcome<Shift>>, ApiError>
where
  S: RosterStore + 'static,
{
  let existing = state.store.get_shift(id).await.map_err(ApiError::store)?;
  state.authorize(&actor, Capability::EditShift, existing.as_ref().map(|s| s.user_id))?;
  let existing = existing.ok_or_else(|| ApiError::not_found("shift", id))?;

  if !state.grants(&actor, Capability::EditShift)
    && body.patch.user_id.is_some_and(|owner| owner != actor.id)
  {
    return Err(Denial::NotOwnResource { capability: Capability::EditShift }.into());
  }

  validate::shift_window(
    body.patch.start_time.unwrap_or(existing.start_time),
    body.patch.end_time.unwrap_or(existing.end_time),
  )?;
  if let Some(department) = &body.patch.department {
    validate::non_empty("department", department)?;
  }

  let outcome = rules::update_shift(&*state.store, Some(actor.id), id, body.patch, body.notify)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("shift", id))?;
  info!(actor = actor.id, id, notify = body.notify, "shift updated");
  Ok(Json(outcome))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
  #[serde(default)]
  pub notify: bool,
}

/// `DELETE /shifts/:id[?notify=true]`
///
/// Responds with the removed shift and the effects that went with it.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<ShiftId>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<Outcome<Shift>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::DeleteShift, None)?;
  let outcome = rules::delete_shift(&*state.store, Some(actor.id), id, params.notify)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("shift", id))?;
  info!(actor = actor.id, id, notify = params.notify, "shift deleted");
  Ok(Json(outcome))
}
