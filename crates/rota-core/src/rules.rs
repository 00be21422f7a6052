//! Domain rules: business transactions layered over a [`RosterStore`].
//!
//! Each transaction commits its primary write first and then applies
//! secondary effects (an [`Activity`](crate::activity::Activity) entry, a
//! notification [`Message`]) on a best-effort basis. A secondary effect that
//! cannot be applied, because a referenced user no longer resolves or the
//! write itself fails, is logged and reported as `false` in [`Effects`]. It
//! never fails or rolls back the primary write.
//!
//! `Ok(None)` always means the primary entity was not found, in which case
//! nothing was written.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
  activity::NewActivity,
  department::{Department, DepartmentId, DepartmentPatch, NewDepartment},
  message::{Message, MessageType, NewMessage, Priority},
  notice::{self, ShiftChange},
  shift::{NewShift, Shift, ShiftId, ShiftPatch},
  store::RosterStore,
  time_off::{Decision, NewTimeOffRequest, TimeOffId, TimeOffRequest},
  user::{NewUser, User, UserId, UserPatch},
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Which secondary effects a transaction managed to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Effects {
  pub activity:     bool,
  pub notification: bool,
}

/// The committed primary value plus the secondary effects that went with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
  #[serde(flatten)]
  pub value:   T,
  pub effects: Effects,
}

impl<T> Outcome<T> {
  pub fn new(value: T, effects: Effects) -> Self { Self { value, effects } }
}

// ─── Best-effort helpers ─────────────────────────────────────────────────────

async fn lookup_user<S: RosterStore>(store: &S, id: UserId) -> Option<User> {
  match store.get_user(id).await {
    Ok(user) => user,
    Err(e) => {
      warn!(user_id = id, error = %e, "user lookup for side effect failed");
      None
    }
  }
}

async fn append_activity<S: RosterStore>(store: &S, activity: NewActivity) -> bool {
  let activity_type = activity.activity_type.clone();
  match store.create_activity(activity).await {
    Ok(_) => true,
    Err(e) => {
      warn!(%activity_type, error = %e, "failed to record activity");
      false
    }
  }
}

async fn notify<S: RosterStore>(store: &S, message: NewMessage) -> bool {
  let receiver_id = message.receiver_id;
  match store.create_message(message).await {
    Ok(_) => true,
    Err(e) => {
      warn!(receiver_id, error = %e, "failed to send notification");
      false
    }
  }
}

// ─── Login ───────────────────────────────────────────────────────────────────

/// Resolve credentials to a user. `None` means the credentials are invalid;
/// the caller cannot tell an unknown username from a wrong password.
///
/// Passwords are stored and compared as plain strings.
pub async fn login<S: RosterStore>(
  store: &S,
  username: &str,
  password: &str,
) -> Result<Option<User>, S::Error> {
  let user = store.get_user_by_username(username.to_owned()).await?;
  Ok(user.filter(|u| u.password == password))
}

// ─── Time off ────────────────────────────────────────────────────────────────

/// File a new pending request and log it against the requester.
pub async fn request_time_off<S: RosterStore>(
  store: &S,
  input: NewTimeOffRequest,
) -> Result<Outcome<TimeOffRequest>, S::Error> {
  let request = store.create_time_off(input).await?;
  debug!(id = request.id, user_id = request.user_id, "time-off request filed");

  let activity = match lookup_user(store, request.user_id).await {
    Some(requester) => {
      append_activity(
        store,
        NewActivity::new("time_off_requested", notice::time_off_requested(&requester, &request))
          .by(Some(requester.id))
          .about(Some(requester.id)),
      )
      .await
    }
    None => false,
  };

  Ok(Outcome::new(request, Effects { activity, notification: false }))
}

/// Approve a pending request.
pub async fn approve_time_off<S: RosterStore>(
  store: &S,
  id: TimeOffId,
  reviewer_id: UserId,
) -> Result<Option<Outcome<TimeOffRequest>>, S::Error> {
  review_time_off(store, id, reviewer_id, Decision::Approve).await
}

/// Deny a pending request.
pub async fn deny_time_off<S: RosterStore>(
  store: &S,
  id: TimeOffId,
  reviewer_id: UserId,
) -> Result<Option<Outcome<TimeOffRequest>>, S::Error> {
  review_time_off(store, id, reviewer_id, Decision::Deny).await
}

/// Apply `decision` to a pending request.
///
/// Fails with [`crate::Error::AlreadyReviewed`] if the request was already approved
/// or denied. The activity entry is written only when both the reviewer and
/// the requester resolve.
pub async fn review_time_off<S: RosterStore>(
  store: &S,
  id: TimeOffId,
  reviewer_id: UserId,
  decision: Decision,
) -> Result<Option<Outcome<TimeOffRequest>>, S::Error> {
  let Some(request) = store.get_time_off(id).await? else {
    return Ok(None);
  };

  let patch = request.review(decision, reviewer_id, Utc::now())?;
  let Some(updated) = store.update_time_off(id, patch).await? else {
    return Ok(None);
  };
  debug!(id, reviewer_id, status = %updated.status, "time-off request reviewed");

  let reviewer = lookup_user(store, reviewer_id).await;
  let requester = lookup_user(store, updated.user_id).await;

  let activity = match (reviewer, requester) {
    (Some(reviewer), Some(requester)) => {
      let description = notice::time_off_reviewed(decision, &reviewer, &requester, &updated);
      append_activity(
        store,
        NewActivity::new(decision.activity_type(), description)
          .by(Some(reviewer.id))
          .about(Some(requester.id)),
      )
      .await
    }
    _ => {
      warn!(id, reviewer_id, "reviewer or requester missing; review not logged");
      false
    }
  };

  Ok(Some(Outcome::new(updated, Effects { activity, notification: false })))
}

// ─── Shifts ──────────────────────────────────────────────────────────────────

async fn shift_effects<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  change: ShiftChange,
  shift: &Shift,
  send_notification: bool,
) -> Effects {
  let Some(owner) = lookup_user(store, shift.user_id).await else {
    warn!(shift_id = shift.id, user_id = shift.user_id, "shift owner missing; no activity");
    return Effects::default();
  };

  let activity = append_activity(
    store,
    NewActivity::new(change.activity_type(), change.describe(&owner, shift))
      .by(actor)
      .about(Some(owner.id)),
  )
  .await;

  let notification = send_notification
    && notify(store, NewMessage {
      sender_id:    actor,
      receiver_id:  owner.id,
      subject:      Some(change.subject().to_owned()),
      content:      change.body(shift),
      priority:     Priority::High,
      message_type: MessageType::Notification,
    })
    .await;

  Effects { activity, notification }
}

/// Schedule a shift, optionally notifying its owner.
pub async fn create_shift<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  input: NewShift,
  send_notification: bool,
) -> Result<Outcome<Shift>, S::Error> {
  let shift = store.create_shift(input).await?;
  debug!(id = shift.id, user_id = shift.user_id, "shift created");
  let effects = shift_effects(store, actor, ShiftChange::Added, &shift, send_notification).await;
  Ok(Outcome::new(shift, effects))
}

/// Modify a shift. Effects reference the owner after the update.
///
/// When the shift changes hands and notifications are on, the previous
/// owner is also told the shift left their schedule; `notification` is then
/// true only if both messages were delivered.
pub async fn update_shift<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  id: ShiftId,
  patch: ShiftPatch,
  send_notification: bool,
) -> Result<Option<Outcome<Shift>>, S::Error> {
  let Some(before) = store.get_shift(id).await? else {
    return Ok(None);
  };
  let Some(shift) = store.update_shift(id, patch).await? else {
    return Ok(None);
  };
  debug!(id, "shift updated");
  let mut effects =
    shift_effects(store, actor, ShiftChange::Updated, &shift, send_notification).await;

  if send_notification && before.user_id != shift.user_id {
    let released = notify_previous_owner(store, actor, &before).await;
    effects.notification &= released;
  }
  Ok(Some(Outcome::new(shift, effects)))
}

async fn notify_previous_owner<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  before: &Shift,
) -> bool {
  let Some(owner) = lookup_user(store, before.user_id).await else {
    warn!(shift_id = before.id, user_id = before.user_id, "previous shift owner missing");
    return false;
  };
  notify(store, NewMessage {
    sender_id:    actor,
    receiver_id:  owner.id,
    subject:      Some(ShiftChange::Deleted.subject().to_owned()),
    content:      ShiftChange::Deleted.body(before),
    priority:     Priority::High,
    message_type: MessageType::Notification,
  })
  .await
}

/// Remove a shift and return what it was.
pub async fn delete_shift<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  id: ShiftId,
  send_notification: bool,
) -> Result<Option<Outcome<Shift>>, S::Error> {
  let Some(shift) = store.get_shift(id).await? else {
    return Ok(None);
  };
  if !store.delete_shift(id).await? {
    return Ok(None);
  }
  debug!(id, "shift deleted");
  let effects = shift_effects(store, actor, ShiftChange::Deleted, &shift, send_notification).await;
  Ok(Some(Outcome::new(shift, effects)))
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Create an account. Fails with [`crate::Error::UsernameTaken`] on a duplicate.
pub async fn create_user<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  input: NewUser,
) -> Result<Outcome<User>, S::Error> {
  let user = store.create_user(input).await?;
  debug!(id = user.id, username = %user.username, "user created");
  let activity = append_activity(
    store,
    NewActivity::new("user_created", notice::user_created(&user))
      .by(actor)
      .about(Some(user.id)),
  )
  .await;
  Ok(Outcome::new(user, Effects { activity, notification: false }))
}

pub async fn update_user<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  id: UserId,
  patch: UserPatch,
) -> Result<Option<Outcome<User>>, S::Error> {
  let Some(user) = store.update_user(id, patch).await? else {
    return Ok(None);
  };
  let activity = append_activity(
    store,
    NewActivity::new("user_updated", notice::user_updated(&user))
      .by(actor)
      .about(Some(user.id)),
  )
  .await;
  Ok(Some(Outcome::new(user, Effects { activity, notification: false })))
}

/// Delete an account.
///
/// Fails with [`crate::Error::UserHasReferences`] while the user still owns shifts
/// or time-off requests. Messages and activities may keep referring to the
/// deleted id.
pub async fn delete_user<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  id: UserId,
) -> Result<Option<Outcome<User>>, S::Error> {
  let Some(user) = store.get_user(id).await? else {
    return Ok(None);
  };
  if !store.delete_user(id).await? {
    return Ok(None);
  }
  debug!(id, "user deleted");

  let activity = append_activity(
    store,
    NewActivity::new("user_deleted", notice::user_deleted(&user)).by(actor),
  )
  .await;
  Ok(Some(Outcome::new(user, Effects { activity, notification: false })))
}

// ─── Departments ─────────────────────────────────────────────────────────────

pub async fn create_department<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  input: NewDepartment,
) -> Result<Outcome<Department>, S::Error> {
  let department = store.create_department(input).await?;
  let activity = append_activity(
    store,
    NewActivity::new("department_created", notice::department_created(&department)).by(actor),
  )
  .await;
  Ok(Outcome::new(department, Effects { activity, notification: false }))
}

pub async fn update_department<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  id: DepartmentId,
  patch: DepartmentPatch,
) -> Result<Option<Outcome<Department>>, S::Error> {
  let Some(department) = store.update_department(id, patch).await? else {
    return Ok(None);
  };
  let activity = append_activity(
    store,
    NewActivity::new("department_updated", notice::department_updated(&department)).by(actor),
  )
  .await;
  Ok(Some(Outcome::new(department, Effects { activity, notification: false })))
}

pub async fn delete_department<S: RosterStore>(
  store: &S,
  actor: Option<UserId>,
  id: DepartmentId,
) -> Result<Option<Outcome<Department>>, S::Error> {
  let Some(department) = store.get_department(id).await? else {
    return Ok(None);
  };
  if !store.delete_department(id).await? {
    return Ok(None);
  }
  let activity = append_activity(
    store,
    NewActivity::new("department_deleted", notice::department_deleted(&department)).by(actor),
  )
  .await;
  Ok(Some(Outcome::new(department, Effects { activity, notification: false })))
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// Deliver a message. `Ok(None)` if the receiver does not exist.
pub async fn send_message<S: RosterStore>(
  store: &S,
  input: NewMessage,
) -> Result<Option<Message>, S::Error> {
  if store.get_user(input.receiver_id).await?.is_none() {
    return Ok(None);
  }
  Ok(Some(store.create_message(input).await?))
}
