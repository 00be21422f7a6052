//! Handlers for `/departments` endpoints.
//!
//! | Method   | Path                | Capability         |
//! |----------|---------------------|--------------------|
//! | `GET`    | `/departments`      | `viewDepartments`  |
//! | `POST`   | `/departments`      | `createDepartment` |
//! | `GET`    | `/departments/:id`  | `viewDepartments`  |
//! | `PATCH`  | `/departments/:id`  | `editDepartment`   |
//! | `DELETE` | `/departments/:id`  | `deleteDepartment` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  department::{Department, DepartmentId, DepartmentPatch, NewDepartment},
  permission::Capability,
  rules::{self, Outcome},
  store::RosterStore,
};
use tracing::info;

use crate::{AppState, CurrentUser, error::ApiError, validate};

/// `GET /departments`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewDepartments, None)?;
  let departments = state.store.list_departments().await.map_err(ApiError::store)?;
  Ok(Json(departments))
}

/// `POST /departments`, body: `{"name":"Bar","color":"blue"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Json(body): Json<NewDepartment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::CreateDepartment, None)?;
  validate::new_department(&body)?;

  let outcome = rules::create_department(&*state.store, Some(actor.id), body)
    .await
    .map_err(ApiError::store)?;
  info!(actor = actor.id, id = outcome.value.id, "department created");
  Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /departments/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<DepartmentId>,
) -> Result<Json<Department>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::ViewDepartments, None)?;
  let department = state
    .store
    .get_department(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("department", id))?;
  Ok(Json(department))
}

/// `PATCH /departments/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<DepartmentId>,
  Json(patch): Json<DepartmentPatch>,
) -> Result<Json<Outcome<Department>>, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::EditDepartment, None)?;
  validate::department_patch(&patch)?;

  let outcome = rules::update_department(&*state.store, Some(actor.id), id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("department", id))?;
  info!(actor = actor.id, id, "department updated");
  Ok(Json(outcome))
}

/// `DELETE /departments/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentUser(actor): CurrentUser,
  Path(id): Path<DepartmentId>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + 'static,
{
  state.authorize(&actor, Capability::DeleteDepartment, None)?;
  rules::delete_department(&*state.store, Some(actor.id), id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("department", id))?;
  info!(actor = actor.id, id, "department deleted");
  Ok(StatusCode::NO_CONTENT)
}
