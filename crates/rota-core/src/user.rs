//! Users: the people who log in, work shifts, and request leave.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::patch::{merge, nullable};

pub type UserId = i64;

/// The role a user holds. Each role maps to a fixed capability set in
/// [`crate::permission::PermissionTable`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Manager,
  Employee,
}

/// A stored user account.
///
/// The password is compared verbatim at login and is never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            UserId,
  pub username:      String,
  #[serde(skip_serializing, default)]
  pub password:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          Role,
  pub position:      Option<String>,
  /// Free-form department name; not checked against the department table.
  pub department:    Option<String>,
  pub profile_image: Option<String>,
}

impl User {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input to [`crate::store::RosterStore::create_user`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub username:      String,
  pub password:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          Role,
  pub position:      Option<String>,
  pub department:    Option<String>,
  pub profile_image: Option<String>,
}

impl NewUser {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    username: impl Into<String>,
    password: impl Into<String>,
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    role: Role,
  ) -> Self {
    Self {
      username: username.into(),
      password: password.into(),
      first_name: first_name.into(),
      last_name: last_name.into(),
      role,
      position: None,
      department: None,
      profile_image: None,
    }
  }

  pub fn into_user(self, id: UserId) -> User {
    User {
      id,
      username: self.username,
      password: self.password,
      first_name: self.first_name,
      last_name: self.last_name,
      role: self.role,
      position: self.position,
      department: self.department,
      profile_image: self.profile_image,
    }
  }
}

/// Partial update for a user. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
  pub username:      Option<String>,
  pub password:      Option<String>,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub role:          Option<Role>,
  #[serde(default, deserialize_with = "nullable")]
  pub position:      Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub department:    Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub profile_image: Option<Option<String>>,
}

impl UserPatch {
  pub fn apply(self, user: &mut User) {
    merge(&mut user.username, self.username);
    merge(&mut user.password, self.password);
    merge(&mut user.first_name, self.first_name);
    merge(&mut user.last_name, self.last_name);
    merge(&mut user.role, self.role);
    merge(&mut user.position, self.position);
    merge(&mut user.department, self.department);
    merge(&mut user.profile_image, self.profile_image);
  }
}
