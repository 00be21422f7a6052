//! Time-off requests and their review state machine.
//!
//! A request starts `pending` and moves exactly once to `approved` or
//! `denied`. Both outcomes are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  patch::{merge, nullable},
  user::UserId,
};

pub type TimeOffId = i64;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeOffStatus {
  #[default]
  Pending,
  Approved,
  Denied,
}

/// The reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approve,
  Deny,
}

impl Decision {
  pub fn status(self) -> TimeOffStatus {
    match self {
      Self::Approve => TimeOffStatus::Approved,
      Self::Deny => TimeOffStatus::Denied,
    }
  }

  /// Activity type recorded for this decision.
  pub fn activity_type(self) -> &'static str {
    match self {
      Self::Approve => "approval",
      Self::Deny => "denial",
    }
  }

  pub fn verb(self) -> &'static str {
    match self {
      Self::Approve => "approved",
      Self::Deny => "denied",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffRequest {
  pub id:          TimeOffId,
  pub user_id:     UserId,
  pub start_date:  NaiveDate,
  pub end_date:    NaiveDate,
  pub reason:      Option<String>,
  pub status:      TimeOffStatus,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
  pub reviewed_by: Option<UserId>,
  pub reviewed_at: Option<DateTime<Utc>>,
}

impl TimeOffRequest {
  pub fn is_pending(&self) -> bool { self.status == TimeOffStatus::Pending }

  /// Build the patch that records `decision`.
  ///
  /// Fails with [`Error::AlreadyReviewed`] unless the request is pending.
  pub fn review(
    &self,
    decision: Decision,
    reviewer_id: UserId,
    at: DateTime<Utc>,
  ) -> Result<TimeOffPatch> {
    if !self.is_pending() {
      return Err(Error::AlreadyReviewed { id: self.id, status: self.status });
    }
    Ok(TimeOffPatch {
      status: Some(decision.status()),
      reviewed_by: Some(Some(reviewer_id)),
      // Invariant: reviewed_at >= created_at.
      reviewed_at: Some(Some(at.max(self.created_at))),
      ..TimeOffPatch::default()
    })
  }
}

/// Input to [`crate::store::RosterStore::create_time_off`]. Status and
/// `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeOffRequest {
  pub user_id:    UserId,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub reason:     Option<String>,
}

impl NewTimeOffRequest {
  pub fn into_request(self, id: TimeOffId, created_at: DateTime<Utc>) -> TimeOffRequest {
    TimeOffRequest {
      id,
      user_id: self.user_id,
      start_date: self.start_date,
      end_date: self.end_date,
      reason: self.reason,
      status: TimeOffStatus::Pending,
      created_at,
      reviewed_by: None,
      reviewed_at: None,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffPatch {
  pub start_date:  Option<NaiveDate>,
  pub end_date:    Option<NaiveDate>,
  #[serde(default, deserialize_with = "nullable")]
  pub reason:      Option<Option<String>>,
  pub status:      Option<TimeOffStatus>,
  #[serde(default, deserialize_with = "nullable")]
  pub reviewed_by: Option<Option<UserId>>,
  #[serde(default, deserialize_with = "nullable")]
  pub reviewed_at: Option<Option<DateTime<Utc>>>,
}

impl TimeOffPatch {
  pub fn apply(self, request: &mut TimeOffRequest) {
    merge(&mut request.start_date, self.start_date);
    merge(&mut request.end_date, self.end_date);
    merge(&mut request.reason, self.reason);
    merge(&mut request.status, self.status);
    merge(&mut request.reviewed_by, self.reviewed_by);
    merge(&mut request.reviewed_at, self.reviewed_at);
  }
}

/// Filter for [`crate::store::RosterStore::list_time_off`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOffQuery {
  pub user_id: Option<UserId>,
  pub status:  Option<TimeOffStatus>,
}

impl TimeOffQuery {
  pub fn matches(&self, request: &TimeOffRequest) -> bool {
    self.user_id.is_none_or(|id| request.user_id == id)
      && self.status.is_none_or(|status| request.status == status)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn pending() -> TimeOffRequest {
    NewTimeOffRequest {
      user_id:    2,
      start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
      end_date:   NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
      reason:     Some("Holiday".into()),
    }
    .into_request(1, Utc::now())
  }

  #[test]
  fn review_of_pending_request_sets_all_fields() {
    let mut request = pending();
    let now = Utc::now();
    request.review(Decision::Approve, 5, now).unwrap().apply(&mut request);

    assert_eq!(request.status, TimeOffStatus::Approved);
    assert_eq!(request.reviewed_by, Some(5));
    assert!(request.reviewed_at.unwrap() >= request.created_at);
  }

  #[test]
  fn reviewed_at_never_predates_creation() {
    let request = pending();
    let earlier = request.created_at - Duration::hours(1);
    let patch = request.review(Decision::Deny, 5, earlier).unwrap();
    assert_eq!(patch.reviewed_at, Some(Some(request.created_at)));
  }

  #[test]
  fn terminal_states_reject_a_second_review() {
    let mut request = pending();
    request
      .review(Decision::Deny, 5, Utc::now())
      .unwrap()
      .apply(&mut request);

    let err = request.review(Decision::Approve, 6, Utc::now()).unwrap_err();
    assert_eq!(
      err,
      Error::AlreadyReviewed { id: 1, status: TimeOffStatus::Denied }
    );
  }

  #[test]
  fn status_round_trips_through_its_name() {
    assert_eq!(TimeOffStatus::Pending.to_string(), "pending");
    assert_eq!("denied".parse::<TimeOffStatus>().unwrap(), TimeOffStatus::Denied);
  }
}
