//! Shifts: one user's working window on one calendar day.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::{
  patch::{merge, nullable},
  user::UserId,
};

pub type ShiftId = i64;

/// A scheduled shift.
///
/// `start_time < end_time` is expected but only checked at the request
/// boundary, never by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
  pub id:         ShiftId,
  pub user_id:    UserId,
  pub date:       NaiveDate,
  pub start_time: NaiveTime,
  pub end_time:   NaiveTime,
  pub department: String,
  pub notes:      Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShift {
  pub user_id:    UserId,
  pub date:       NaiveDate,
  #[serde(deserialize_with = "wall_clock")]
  pub start_time: NaiveTime,
  #[serde(deserialize_with = "wall_clock")]
  pub end_time:   NaiveTime,
  pub department: String,
  pub notes:      Option<String>,
}

impl NewShift {
  pub fn into_shift(self, id: ShiftId) -> Shift {
    Shift {
      id,
      user_id: self.user_id,
      date: self.date,
      start_time: self.start_time,
      end_time: self.end_time,
      department: self.department,
      notes: self.notes,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
  pub user_id:    Option<UserId>,
  pub date:       Option<NaiveDate>,
  #[serde(default, deserialize_with = "optional_wall_clock")]
  pub start_time: Option<NaiveTime>,
  #[serde(default, deserialize_with = "optional_wall_clock")]
  pub end_time:   Option<NaiveTime>,
  pub department: Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub notes:      Option<Option<String>>,
}

impl ShiftPatch {
  pub fn is_empty(&self) -> bool {
    self.user_id.is_none()
      && self.date.is_none()
      && self.start_time.is_none()
      && self.end_time.is_none()
      && self.department.is_none()
      && self.notes.is_none()
  }

  pub fn apply(self, shift: &mut Shift) {
    merge(&mut shift.user_id, self.user_id);
    merge(&mut shift.date, self.date);
    merge(&mut shift.start_time, self.start_time);
    merge(&mut shift.end_time, self.end_time);
    merge(&mut shift.department, self.department);
    merge(&mut shift.notes, self.notes);
  }
}

/// Filter for [`crate::store::RosterStore::list_shifts`]. All bounds are
/// inclusive and compare on the calendar date only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftQuery {
  pub user_id: Option<UserId>,
  pub from:    Option<NaiveDate>,
  pub to:      Option<NaiveDate>,
}

impl ShiftQuery {
  pub fn for_user(user_id: UserId) -> Self {
    Self { user_id: Some(user_id), ..Self::default() }
  }

  pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
    Self { from: Some(from), to: Some(to), ..Self::default() }
  }

  pub fn matches(&self, shift: &Shift) -> bool {
    self.user_id.is_none_or(|id| shift.user_id == id)
      && self.from.is_none_or(|from| shift.date >= from)
      && self.to.is_none_or(|to| shift.date <= to)
  }
}

// ─── Wall-clock parsing ──────────────────────────────────────────────────────

/// Parse `HH:MM:SS`, falling back to `HH:MM` as sent by time pickers.
pub fn parse_wall_clock(s: &str) -> Option<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .ok()
}

fn wall_clock<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_wall_clock(&raw)
    .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw:?}")))
}

fn optional_wall_clock<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(deserializer)? {
    Some(raw) => parse_wall_clock(&raw)
      .map(Some)
      .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw:?}"))),
    None => Ok(None),
  }
}
