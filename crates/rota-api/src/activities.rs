//! Handler for `GET /activities[?limit=<n>]`, the newest-first activity log.

use axum::{
  Json,
  extract::{Query, State},
};
use rota_core::{activity::Activity, permission::Capability, store::RosterStore};
use serde::Deserialize;

use crate::{AppState, CurrentUser, error::ApiError, validate};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Activity>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewUsers, None)?;
  validate::limit(params.limit)?;
  let activities = state
    .store
    .list_activities(params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(activities))
}
