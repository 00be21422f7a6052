//! Request-boundary validation. Stores accept whatever they are given, so
//! every shape rule lives here and fails with 400.

use chrono::{NaiveDate, NaiveTime};
use rota_core::{
  department::{DepartmentPatch, NewDepartment},
  user::{NewUser, UserPatch},
};

use crate::error::ApiError;

pub fn non_empty(field: &str, value: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::BadRequest(format!("{field} must not be empty")));
  }
  Ok(())
}

fn non_empty_opt(field: &str, value: Option<&str>) -> Result<(), ApiError> {
  value.map_or(Ok(()), |v| non_empty(field, v))
}

pub fn new_user(input: &NewUser) -> Result<(), ApiError> {
  non_empty("username", &input.username)?;
  non_empty("password", &input.password)?;
  non_empty("firstName", &input.first_name)?;
  non_empty("lastName", &input.last_name)
}

pub fn user_patch(patch: &UserPatch) -> Result<(), ApiError> {
  non_empty_opt("username", patch.username.as_deref())?;
  non_empty_opt("password", patch.password.as_deref())?;
  non_empty_opt("firstName", patch.first_name.as_deref())?;
  non_empty_opt("lastName", patch.last_name.as_deref())
}

pub fn new_department(input: &NewDepartment) -> Result<(), ApiError> {
  non_empty("name", &input.name)?;
  non_empty("color", &input.color)
}

pub fn department_patch(patch: &DepartmentPatch) -> Result<(), ApiError> {
  non_empty_opt("name", patch.name.as_deref())?;
  non_empty_opt("color", patch.color.as_deref())
}

/// A shift must end after it starts on the same day.
pub fn shift_window(start: NaiveTime, end: NaiveTime) -> Result<(), ApiError> {
  if start >= end {
    return Err(ApiError::BadRequest(format!(
      "shift must end after it starts ({start} to {end})"
    )));
  }
  Ok(())
}

/// Time-off ranges are inclusive, so a single day is `start == end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
  if start > end {
    return Err(ApiError::BadRequest(format!(
      "startDate {start} is after endDate {end}"
    )));
  }
  Ok(())
}

pub fn limit(limit: Option<usize>) -> Result<(), ApiError> {
  if limit == Some(0) {
    return Err(ApiError::BadRequest("limit must be at least 1".into()));
  }
  Ok(())
}
