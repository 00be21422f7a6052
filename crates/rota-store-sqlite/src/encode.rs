//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with a fixed nanosecond width, so their
//! lexical order matches chronological order. Dates are `YYYY-MM-DD`, times
//! `HH:MM:SS`, and enums use their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Row, types::Type};

use rota_core::{
  activity::Activity,
  department::Department,
  message::Message,
  shift::Shift,
  time_off::TimeOffRequest,
  user::User,
};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

/// Read a text column and parse it with `FromStr`.
fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let raw: String = row.get(idx)?;
  raw
    .parse()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Nullable variant of [`parsed`].
fn parsed_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let raw: Option<String> = row.get(idx)?;
  raw
    .map(|s| s.parse())
    .transpose()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── Row mappers ─────────────────────────────────────────────────────────────
//
// Each `*_COLUMNS` list matches the field order its mapper reads.

pub const USER_COLUMNS: &str =
  "id, username, password, first_name, last_name, role, position, department, profile_image";

pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:            row.get(0)?,
    username:      row.get(1)?,
    password:      row.get(2)?,
    first_name:    row.get(3)?,
    last_name:     row.get(4)?,
    role:          parsed(row, 5)?,
    position:      row.get(6)?,
    department:    row.get(7)?,
    profile_image: row.get(8)?,
  })
}

pub const DEPARTMENT_COLUMNS: &str = "id, name, color";

pub fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
  Ok(Department { id: row.get(0)?, name: row.get(1)?, color: row.get(2)? })
}

pub const SHIFT_COLUMNS: &str = "id, user_id, date, start_time, end_time, department, notes";

pub fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<Shift> {
  Ok(Shift {
    id:         row.get(0)?,
    user_id:    row.get(1)?,
    date:       parsed(row, 2)?,
    start_time: parsed(row, 3)?,
    end_time:   parsed(row, 4)?,
    department: row.get(5)?,
    notes:      row.get(6)?,
  })
}

pub const TIME_OFF_COLUMNS: &str =
  "id, user_id, start_date, end_date, reason, status, created_at, reviewed_by, reviewed_at";

pub fn time_off_from_row(row: &Row<'_>) -> rusqlite::Result<TimeOffRequest> {
  Ok(TimeOffRequest {
    id:          row.get(0)?,
    user_id:     row.get(1)?,
    start_date:  parsed(row, 2)?,
    end_date:    parsed(row, 3)?,
    reason:      row.get(4)?,
    status:      parsed(row, 5)?,
    created_at:  parsed(row, 6)?,
    reviewed_by: row.get(7)?,
    reviewed_at: parsed_opt(row, 8)?,
  })
}

pub const ACTIVITY_COLUMNS: &str =
  "id, type, description, user_id, related_user_id, created_at";

pub fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
  Ok(Activity {
    id:              row.get(0)?,
    activity_type:   row.get(1)?,
    description:     row.get(2)?,
    user_id:         row.get(3)?,
    related_user_id: row.get(4)?,
    created_at:      parsed(row, 5)?,
  })
}

pub const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, subject, content, is_read, \
                                   priority, message_type, created_at";

pub fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
  Ok(Message {
    id:           row.get(0)?,
    sender_id:    row.get(1)?,
    receiver_id:  row.get(2)?,
    subject:      row.get(3)?,
    content:      row.get(4)?,
    is_read:      row.get(5)?,
    priority:     parsed(row, 6)?,
    message_type: parsed(row, 7)?,
    created_at:   parsed(row, 8)?,
  })
}
