//! [`MemoryStore`], the in-memory implementation of [`RosterStore`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::trace;

use rota_core::{
  Error, Result,
  activity::{Activity, ActivityId, NewActivity},
  department::{Department, DepartmentId, DepartmentPatch, NewDepartment},
  message::{Message, MessageId, NewMessage},
  shift::{NewShift, Shift, ShiftId, ShiftPatch, ShiftQuery},
  store::RosterStore,
  time_off::{NewTimeOffRequest, TimeOffId, TimeOffPatch, TimeOffQuery, TimeOffRequest},
  user::{NewUser, User, UserId, UserPatch},
};

use crate::table::Table;

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
  users:       RwLock<Table<User>>,
  departments: RwLock<Table<Department>>,
  shifts:      RwLock<Table<Shift>>,
  time_off:    RwLock<Table<TimeOffRequest>>,
  activities:  RwLock<Table<Activity>>,
  messages:    RwLock<Table<Message>>,
}

/// A Rota entity store held entirely in process memory.
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for MemoryStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    Ok(self.tables.users.read().await.get(id))
  }

  async fn get_user_by_username(&self, username: String) -> Result<Option<User>> {
    Ok(self.tables.users.read().await.find(|u| u.username == username))
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    Ok(self.tables.users.read().await.filter(|_| true))
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let mut users = self.tables.users.write().await;
    if users.any(|_, u| u.username == input.username) {
      return Err(Error::UsernameTaken(input.username));
    }
    let user = users.insert_with(|id| input.into_user(id));
    trace!(id = user.id, "user inserted");
    Ok(user)
  }

  async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
    let mut users = self.tables.users.write().await;
    if users.get(id).is_none() {
      return Ok(None);
    }
    if let Some(name) = &patch.username
      && users.any(|other_id, u| *other_id != id && &u.username == name)
    {
      return Err(Error::UsernameTaken(name.clone()));
    }
    Ok(users.modify(id, |user| patch.apply(user)))
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    // Lock order: users, shifts, time_off.
    let mut users = self.tables.users.write().await;
    let shifts = self.tables.shifts.read().await;
    let time_off = self.tables.time_off.read().await;
    if users.get(id).is_none() {
      return Ok(false);
    }
    if shifts.any(|_, s| s.user_id == id) || time_off.any(|_, r| r.user_id == id) {
      return Err(Error::UserHasReferences(id));
    }
    Ok(users.remove(id))
  }

  // ── Departments ───────────────────────────────────────────────────────────

  async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
    Ok(self.tables.departments.read().await.get(id))
  }

  async fn get_department_by_name(&self, name: String) -> Result<Option<Department>> {
    Ok(self.tables.departments.read().await.find(|d| d.name == name))
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    Ok(self.tables.departments.read().await.filter(|_| true))
  }

  async fn create_department(&self, input: NewDepartment) -> Result<Department> {
    let mut departments = self.tables.departments.write().await;
    if departments.any(|_, d| d.name == input.name) {
      return Err(Error::DepartmentNameTaken(input.name));
    }
    let department = departments.insert_with(|id| input.into_department(id));
    trace!(id = department.id, "department inserted");
    Ok(department)
  }

  async fn update_department(
    &self,
    id:    DepartmentId,
    patch: DepartmentPatch,
  ) -> Result<Option<Department>> {
    let mut departments = self.tables.departments.write().await;
    if departments.get(id).is_none() {
      return Ok(None);
    }
    if let Some(name) = &patch.name
      && departments.any(|other_id, d| *other_id != id && &d.name == name)
    {
      return Err(Error::DepartmentNameTaken(name.clone()));
    }
    Ok(departments.modify(id, |department| patch.apply(department)))
  }

  async fn delete_department(&self, id: DepartmentId) -> Result<bool> {
    Ok(self.tables.departments.write().await.remove(id))
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn get_shift(&self, id: ShiftId) -> Result<Option<Shift>> {
    Ok(self.tables.shifts.read().await.get(id))
  }

  async fn list_shifts(&self, query: ShiftQuery) -> Result<Vec<Shift>> {
    Ok(self.tables.shifts.read().await.filter(|s| query.matches(s)))
  }

  async fn create_shift(&self, input: NewShift) -> Result<Shift> {
    let shift = self
      .tables
      .shifts
      .write()
      .await
      .insert_with(|id| input.into_shift(id));
    trace!(id = shift.id, "shift inserted");
    Ok(shift)
  }

  async fn update_shift(&self, id: ShiftId, patch: ShiftPatch) -> Result<Option<Shift>> {
    Ok(
      self
        .tables
        .shifts
        .write()
        .await
        .modify(id, |shift| patch.apply(shift)),
    )
  }

  async fn delete_shift(&self, id: ShiftId) -> Result<bool> {
    Ok(self.tables.shifts.write().await.remove(id))
  }

  // ── Time off ──────────────────────────────────────────────────────────────

  async fn get_time_off(&self, id: TimeOffId) -> Result<Option<TimeOffRequest>> {
    Ok(self.tables.time_off.read().await.get(id))
  }

  async fn list_time_off(&self, query: TimeOffQuery) -> Result<Vec<TimeOffRequest>> {
    Ok(self.tables.time_off.read().await.filter(|r| query.matches(r)))
  }

  async fn create_time_off(&self, input: NewTimeOffRequest) -> Result<TimeOffRequest> {
    let request = self
      .tables
      .time_off
      .write()
      .await
      .insert_with(|id| input.into_request(id, Utc::now()));
    trace!(id = request.id, "time-off request inserted");
    Ok(request)
  }

  async fn update_time_off(
    &self,
    id:    TimeOffId,
    patch: TimeOffPatch,
  ) -> Result<Option<TimeOffRequest>> {
    Ok(
      self
        .tables
        .time_off
        .write()
        .await
        .modify(id, |request| patch.apply(request)),
    )
  }

  async fn delete_time_off(&self, id: TimeOffId) -> Result<bool> {
    Ok(self.tables.time_off.write().await.remove(id))
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>> {
    Ok(self.tables.activities.read().await.get(id))
  }

  async fn list_activities(&self, limit: Option<usize>) -> Result<Vec<Activity>> {
    let mut activities = self.tables.activities.read().await.filter(|_| true);
    activities.sort_by(Activity::newest_first);
    if let Some(limit) = limit {
      activities.truncate(limit);
    }
    Ok(activities)
  }

  async fn create_activity(&self, input: NewActivity) -> Result<Activity> {
    let activity = self
      .tables
      .activities
      .write()
      .await
      .insert_with(|id| input.into_activity(id, Utc::now()));
    trace!(id = activity.id, activity_type = %activity.activity_type, "activity appended");
    Ok(activity)
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
    Ok(self.tables.messages.read().await.get(id))
  }

  async fn list_messages_for_user(&self, user_id: UserId) -> Result<Vec<Message>> {
    Ok(self.tables.messages.read().await.filter(|m| m.involves(user_id)))
  }

  async fn create_message(&self, input: NewMessage) -> Result<Message> {
    let message = self
      .tables
      .messages
      .write()
      .await
      .insert_with(|id| input.into_message(id, Utc::now()));
    trace!(id = message.id, receiver_id = message.receiver_id, "message inserted");
    Ok(message)
  }

  async fn mark_message_read(&self, id: MessageId) -> Result<Option<Message>> {
    Ok(
      self
        .tables
        .messages
        .write()
        .await
        .modify(id, |message| message.is_read = true),
    )
  }

  async fn delete_message(&self, id: MessageId) -> Result<bool> {
    Ok(self.tables.messages.write().await.remove(id))
  }

  async fn unread_message_count(&self, user_id: UserId) -> Result<usize> {
    Ok(self.tables.messages.read().await.count(|m| m.is_unread_by(user_id)))
  }
}
