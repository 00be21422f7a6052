//! Human-readable text for activity descriptions and shift notifications.
//!
//! Everything here is pure formatting; [`crate::rules`] decides when the
//! text is written.

use chrono::{NaiveDate, NaiveTime};

use crate::{
  department::Department,
  shift::Shift,
  time_off::{Decision, TimeOffRequest},
  user::User,
};

/// `Monday, June 10, 2024`
pub fn format_date(date: NaiveDate) -> String { date.format("%A, %B %-d, %Y").to_string() }

/// `09:00`; seconds are dropped.
pub fn format_time(time: NaiveTime) -> String { time.format("%H:%M").to_string() }

fn window(shift: &Shift) -> String {
  format!("{} to {}", format_time(shift.start_time), format_time(shift.end_time))
}

// ─── Shifts ──────────────────────────────────────────────────────────────────

/// The kind of schedule mutation a shift went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftChange {
  Added,
  Updated,
  Deleted,
}

impl ShiftChange {
  pub fn activity_type(self) -> &'static str {
    match self {
      Self::Added => "shift_added",
      Self::Updated => "shift_updated",
      Self::Deleted => "shift_deleted",
    }
  }

  pub fn describe(self, owner: &User, shift: &Shift) -> String {
    let verb = match self {
      Self::Added => "added",
      Self::Updated => "updated",
      Self::Deleted => "deleted",
    };
    format!(
      "Shift {verb} for {} on {} ({}, {})",
      owner.full_name(),
      format_date(shift.date),
      window(shift),
      shift.department,
    )
  }

  pub fn subject(self) -> &'static str {
    match self {
      Self::Added => "New shift scheduled",
      Self::Updated => "Your schedule has changed",
      Self::Deleted => "Shift removed",
    }
  }

  pub fn body(self, shift: &Shift) -> String {
    let date = format_date(shift.date);
    let window = window(shift);
    let department = &shift.department;
    match self {
      Self::Added => format!(
        "You have been scheduled to work on {date} from {window} in {department}."
      ),
      Self::Updated => format!(
        "Your shift on {date} has been modified. It now runs from {window} in {department}."
      ),
      Self::Deleted => format!(
        "Your shift on {date} from {window} in {department} has been removed from the schedule."
      ),
    }
  }
}

// ─── Time off ────────────────────────────────────────────────────────────────

pub fn time_off_requested(requester: &User, request: &TimeOffRequest) -> String {
  format!(
    "{} requested time off from {} to {}",
    requester.full_name(),
    format_date(request.start_date),
    format_date(request.end_date),
  )
}

pub fn time_off_reviewed(
  decision: Decision,
  reviewer: &User,
  requester: &User,
  request: &TimeOffRequest,
) -> String {
  format!(
    "{} {} the time-off request of {} ({} to {})",
    reviewer.full_name(),
    decision.verb(),
    requester.full_name(),
    format_date(request.start_date),
    format_date(request.end_date),
  )
}

// ─── Users and departments ───────────────────────────────────────────────────

pub fn user_created(user: &User) -> String {
  format!("New user {} ({}) was created as {}", user.full_name(), user.username, user.role)
}

pub fn user_updated(user: &User) -> String {
  format!("Profile of {} was updated", user.full_name())
}

pub fn user_deleted(user: &User) -> String {
  format!("User {} ({}) was deleted", user.full_name(), user.username)
}

pub fn department_created(department: &Department) -> String {
  format!("Department {} was created", department.name)
}

pub fn department_updated(department: &Department) -> String {
  format!("Department {} was updated", department.name)
}

pub fn department_deleted(department: &Department) -> String {
  format!("Department {} was deleted", department.name)
}
