//! Error types for `rota-core`.
//!
//! Only relationship invariants owned by the core appear here. A missing
//! primary entity is never an error; store and rule operations surface it as
//! `None`.

use thiserror::Error;

use crate::{time_off::TimeOffStatus, user::UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  #[error("department name {0:?} is already taken")]
  DepartmentNameTaken(String),

  #[error("time-off request {id} was already {status}")]
  AlreadyReviewed { id: i64, status: TimeOffStatus },

  #[error("user {0} still owns shifts or time-off requests")]
  UserHasReferences(UserId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
