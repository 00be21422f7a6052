//! JSON REST API for Rota.
//!
//! Exposes an axum [`Router`] backed by any [`rota_core::store::RosterStore`].
//! Every route except `POST /auth/login` requires HTTP Basic credentials,
//! and every route checks the caller's capabilities against the
//! [`PermissionTable`] held in [`AppState`] before touching the target.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rota_api::api_router(AppState::new(store, PermissionTable::standard())))
//! ```

pub mod activities;
pub mod auth;
pub mod departments;
pub mod error;
pub mod messages;
pub mod shifts;
pub mod time_off;
pub mod users;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use rota_core::{
  permission::{Capability, PermissionTable},
  store::RosterStore,
  user::{User, UserId},
};
use tracing::warn;

pub use auth::CurrentUser;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:       Arc<S>,
  pub permissions: Arc<PermissionTable>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, permissions: PermissionTable) -> Self {
    Self { store, permissions: Arc::new(permissions) }
  }

  /// Whether `user`'s role holds `capability` outright.
  pub fn grants(&self, user: &User, capability: Capability) -> bool {
    self.permissions.grants(user.role, capability)
  }

  /// Check `capability` for `user`, mapping a denial to 403.
  pub fn authorize(
    &self,
    user: &User,
    capability: Capability,
    resource_owner: Option<UserId>,
  ) -> Result<(), ApiError> {
    self
      .permissions
      .authorize(user, capability, resource_owner)
      .map_err(|denial| {
        warn!(user_id = user.id, %capability, %denial, "request denied");
        ApiError::Forbidden(denial)
      })
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), permissions: Arc::clone(&self.permissions) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RosterStore + 'static,
{
  Router::new()
    // Session
    .route("/auth/login", post(auth::login::<S>))
    .route("/me", get(auth::me::<S>))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .patch(users::update::<S>)
        .delete(users::remove::<S>),
    )
    // Departments
    .route("/departments", get(departments::list::<S>).post(departments::create::<S>))
    .route(
      "/departments/{id}",
      get(departments::get_one::<S>)
        .patch(departments::update::<S>)
        .delete(departments::remove::<S>),
    )
    // Shifts
    .route("/shifts", get(shifts::list::<S>).post(shifts::create::<S>))
    .route(
      "/shifts/{id}",
      get(shifts::get_one::<S>)
        .patch(shifts::update::<S>)
        .delete(shifts::remove::<S>),
    )
    // Time off
    .route("/time-off", get(time_off::list::<S>).post(time_off::create::<S>))
    .route("/time-off/{id}/approve", post(time_off::approve::<S>))
    .route("/time-off/{id}/deny", post(time_off::deny::<S>))
    // Activity log
    .route("/activities", get(activities::list::<S>))
    // Messages
    .route("/messages", get(messages::list::<S>).post(messages::send::<S>))
    .route("/messages/unread-count", get(messages::unread_count::<S>))
    .route("/messages/{id}/read", post(messages::mark_read::<S>))
    .route("/messages/{id}", delete(messages::remove::<S>))
    .with_state(state)
}
