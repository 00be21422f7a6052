//! The `RosterStore` trait, the entity store interface.
//!
//! The trait is implemented by storage backends (`rota-store-memory`,
//! `rota-store-sqlite`). Higher layers (`rota_core::rules`, `rota-api`)
//! depend on this abstraction, not on any concrete backend.
//!
//! Every kind follows the same shape: `get` and `update` yield `None` for a
//! missing id, `delete` reports whether an entry existed, and `create`
//! assigns the next id for that kind. Ids are strictly increasing per kind
//! and never reused. Nothing cascades.

use std::future::Future;

use crate::{
  activity::{Activity, ActivityId, NewActivity},
  department::{Department, DepartmentId, DepartmentPatch, NewDepartment},
  message::{Message, MessageId, NewMessage},
  shift::{NewShift, Shift, ShiftId, ShiftPatch, ShiftQuery},
  time_off::{NewTimeOffRequest, TimeOffId, TimeOffPatch, TimeOffQuery, TimeOffRequest},
  user::{NewUser, User, UserId, UserPatch},
};

// ─── Error bound ─────────────────────────────────────────────────────────────

/// Bound on backend error types.
///
/// Backends must be able to carry a core [`crate::Error`] (uniqueness
/// violations raised inside the store, state-machine violations raised by
/// the rules) and hand it back so the request layer can tell a conflict from
/// an infrastructure failure.
pub trait StoreError: std::error::Error + From<crate::Error> + Send + Sync + 'static {
  fn as_core(&self) -> Option<&crate::Error>;
}

impl StoreError for crate::Error {
  fn as_core(&self) -> Option<&crate::Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Rota entity store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`). Implementations serialise writes
/// per entity kind so id assignment stays unique and monotonic.
pub trait RosterStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::UsernameTaken`] if the username is in use.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::UsernameTaken`] if the patch renames the
  /// user to another user's username.
  fn update_user(
    &self,
    id: UserId,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Remove a user. Fails with [`crate::Error::UserHasReferences`] while shifts or
  /// time-off requests still name the user; the check and the removal
  /// happen as one step.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Departments ───────────────────────────────────────────────────────

  fn get_department(
    &self,
    id: DepartmentId,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  fn get_department_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::DepartmentNameTaken`] on a duplicate name.
  fn create_department(
    &self,
    input: NewDepartment,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  fn update_department(
    &self,
    id: DepartmentId,
    patch: DepartmentPatch,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  fn delete_department(
    &self,
    id: DepartmentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Shifts ────────────────────────────────────────────────────────────

  fn get_shift(
    &self,
    id: ShiftId,
  ) -> impl Future<Output = Result<Option<Shift>, Self::Error>> + Send + '_;

  /// Shifts matching `query`, in creation order.
  fn list_shifts(
    &self,
    query: ShiftQuery,
  ) -> impl Future<Output = Result<Vec<Shift>, Self::Error>> + Send + '_;

  fn create_shift(
    &self,
    input: NewShift,
  ) -> impl Future<Output = Result<Shift, Self::Error>> + Send + '_;

  fn update_shift(
    &self,
    id: ShiftId,
    patch: ShiftPatch,
  ) -> impl Future<Output = Result<Option<Shift>, Self::Error>> + Send + '_;

  fn delete_shift(
    &self,
    id: ShiftId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Time off ──────────────────────────────────────────────────────────

  fn get_time_off(
    &self,
    id: TimeOffId,
  ) -> impl Future<Output = Result<Option<TimeOffRequest>, Self::Error>> + Send + '_;

  fn list_time_off(
    &self,
    query: TimeOffQuery,
  ) -> impl Future<Output = Result<Vec<TimeOffRequest>, Self::Error>> + Send + '_;

  /// The request is stored `pending` with `created_at` set to now.
  fn create_time_off(
    &self,
    input: NewTimeOffRequest,
  ) -> impl Future<Output = Result<TimeOffRequest, Self::Error>> + Send + '_;

  /// Raw merge; the review state machine lives in [`crate::rules`].
  fn update_time_off(
    &self,
    id: TimeOffId,
    patch: TimeOffPatch,
  ) -> impl Future<Output = Result<Option<TimeOffRequest>, Self::Error>> + Send + '_;

  fn delete_time_off(
    &self,
    id: TimeOffId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Activities (append-only) ──────────────────────────────────────────

  fn get_activity(
    &self,
    id: ActivityId,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  /// Newest first (ties broken by higher id), truncated to `limit`.
  fn list_activities(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  fn create_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  fn get_message(
    &self,
    id: MessageId,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Messages the user sent or received, in creation order.
  fn list_messages_for_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  fn create_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// One-way `is_read` transition. Marking an already-read message is a
  /// no-op that still returns it.
  fn mark_message_read(
    &self,
    id: MessageId,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  fn delete_message(
    &self,
    id: MessageId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Messages received by `user_id` that are still unread.
  fn unread_message_count(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
