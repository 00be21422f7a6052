//! Handlers for `/time-off` endpoints.
//!
//! | Method | Path                    | Capability       | Notes |
//! |--------|-------------------------|------------------|-------|
//! | `GET`  | `/time-off`             | `viewTimeOff`    | `?userId`, `?status`; reviewers see everyone, others only themselves |
//! | `POST` | `/time-off`             | `createTimeOff`  | Filing for someone else needs `approveTimeOff` |
//! | `POST` | `/time-off/:id/approve` | `approveTimeOff` | 409 if already reviewed |
//! | `POST` | `/time-off/:id/deny`    | `approveTimeOff` | 409 if already reviewed |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rota_core::{
  permission::Capability,
  rules::{self, Outcome},
  store::RosterStore,
  time_off::{Decision, NewTimeOffRequest, TimeOffId, TimeOffQuery, TimeOffRequest, TimeOffStatus},
  user::{User, UserId},
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, CurrentUser, error::ApiError, validate};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub user_id: Option<UserId>,
  pub status:  Option<TimeOffStatus>,
}

/// `GET /time-off[?userId=<id>][&status=pending|approved|denied]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<TimeOffRequest>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewTimeOff, None)?;

  let user_id = if state.grants(&actor, Capability::ApproveTimeOff) {
    params.user_id
  } else {
    Some(actor.id)
  };
  let query = TimeOffQuery { user_id, status: params.status };
  let requests = state.store.list_time_off(query).await.map_err(ApiError::store)?;
  Ok(Json(requests))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  /// Defaults to the caller.
  pub user_id:    Option<UserId>,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub reason:     Option<String>,
}

/// `POST /time-off`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::CreateTimeOff, None)?;

  let user_id = body.user_id.unwrap_or(actor.id);
  if user_id != actor.id {
    state.authorize(&actor, Capability::ApproveTimeOff, None)?;
  }
  validate::date_range(body.start_date, body.end_date)?;

  let input = NewTimeOffRequest {
    user_id,
    start_date: body.start_date,
    end_date: body.end_date,
    reason: body.reason,
  };
  let outcome = rules::request_time_off(&*state.store, input)
    .await
    .map_err(ApiError::store)?;
  info!(actor = actor.id, id = outcome.value.id, user_id, "time off requested");
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Review ──────────────────────────────────────────────────────────────────

async fn review<S>(
  state: &AppState<S>,
  actor: &User,
  id: TimeOffId,
  decision: Decision,
) -> Result<Json<Outcome<TimeOffRequest>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(actor, Capability::ApproveTimeOff, None)?;
  let outcome = rules::review_time_off(&*state.store, id, actor.id, decision)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("time-off request", id))?;
  info!(actor = actor.id, id, status = %outcome.value.status, "time off reviewed");
  Ok(Json(outcome))
}

/// `POST /time-off/:id/approve`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<TimeOffId>,
) -> Result<Json<Outcome<TimeOffRequest>>, ApiError>
where
  S: RosterStore + 'static,
{
  review(&state, &actor, id, Decision::Approve).await
}

/// `POST /time-off/:id/deny`
pub async fn deny<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<TimeOffId>,
) -> Result<Json<Outcome<TimeOffRequest>>, ApiError>
where
  S: RosterStore + 'static,
{
  review(&state, &actor, id, Decision::Deny).await
}
