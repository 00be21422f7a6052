//! Role-based permissions.
//!
//! A [`PermissionTable`] maps each [`Role`] to a fixed set of
//! [`Capability`] bits. It is built once at startup and handed to whoever
//! needs it; nothing mutates it afterwards.
//!
//! [`PermissionTable::authorize`] adds one context-sensitive rule on top of
//! the table: a role holding [`Capability::EditOwnShift`] may use
//! [`Capability::EditShift`] on a shift it owns.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};
use thiserror::Error;

use crate::user::{Role, User, UserId};

/// A single named permission bit.
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
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Capability {
  ViewUsers,
  CreateUser,
  EditUser,
  DeleteUser,
  ViewDepartments,
  CreateDepartment,
  EditDepartment,
  DeleteDepartment,
  ViewShifts,
  CreateShift,
  EditShift,
  EditOwnShift,
  DeleteShift,
  ViewTimeOff,
  CreateTimeOff,
  ApproveTimeOff,
  ViewMessages,
  SendMessages,
}

/// Why [`PermissionTable::authorize`] refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
  #[error("role {role} lacks the {capability} permission")]
  NoPermission { role: Role, capability: Capability },

  #[error("{capability} is only allowed on your own resource")]
  NotOwnResource { capability: Capability },
}

/// Static role → capability mapping.
#[derive(Debug, Clone)]
pub struct PermissionTable {
  grants: HashMap<Role, HashSet<Capability>>,
}

impl PermissionTable {
  /// Build a table from explicit grants. Roles without an entry hold nothing.
  pub fn new(grants: HashMap<Role, HashSet<Capability>>) -> Self { Self { grants } }

  /// The stock table. Admins hold every capability.
  pub fn standard() -> Self {
    use Capability::*;

    let admin: HashSet<Capability> = Capability::iter().collect();

    let manager = HashSet::from([
      ViewUsers,
      EditUser,
      ViewDepartments,
      ViewShifts,
      CreateShift,
      EditShift,
      EditOwnShift,
      DeleteShift,
      ViewTimeOff,
      CreateTimeOff,
      ApproveTimeOff,
      ViewMessages,
      SendMessages,
    ]);

    let employee = HashSet::from([
      ViewUsers,
      ViewDepartments,
      ViewShifts,
      EditOwnShift,
      ViewTimeOff,
      CreateTimeOff,
      ViewMessages,
      SendMessages,
    ]);

    Self::new(HashMap::from([
      (Role::Admin, admin),
      (Role::Manager, manager),
      (Role::Employee, employee),
    ]))
  }

  /// Whether `role` holds `capability` outright.
  pub fn grants(&self, role: Role, capability: Capability) -> bool {
    self
      .grants
      .get(&role)
      .is_some_and(|caps| caps.contains(&capability))
  }

  /// Every capability `role` holds, in declaration order.
  pub fn capabilities(&self, role: Role) -> Vec<Capability> {
    Capability::iter().filter(|c| self.grants(role, *c)).collect()
  }

  /// Decide whether `user` may exercise `capability`.
  ///
  /// `resource_owner` is the owner of the target resource when known. It
  /// only matters for [`Capability::EditShift`], where a role holding
  /// [`Capability::EditOwnShift`] is allowed through if the owner is the
  /// user themself.
  pub fn authorize(
    &self,
    user: &User,
    capability: Capability,
    resource_owner: Option<UserId>,
  ) -> Result<(), Denial> {
    if self.grants(user.role, capability) {
      return Ok(());
    }

    if capability == Capability::EditShift
      && self.grants(user.role, Capability::EditOwnShift)
    {
      return if resource_owner == Some(user.id) {
        Ok(())
      } else {
        Err(Denial::NotOwnResource { capability })
      };
    }

    Err(Denial::NoPermission { role: user.role, capability })
  }
}

impl Default for PermissionTable {
  fn default() -> Self { Self::standard() }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::user::NewUser;

  fn user(id: UserId, role: Role) -> User {
    NewUser::new(format!("user{id}"), "pw", "Test", "User", role).into_user(id)
  }

  fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Manager), Just(Role::Employee)]
  }

  fn capability_strategy() -> impl Strategy<Value = Capability> {
    let all: Vec<Capability> = Capability::iter().collect();
    proptest::sample::select(all)
  }

  #[test]
  fn there_are_eighteen_capabilities() {
    assert_eq!(Capability::iter().count(), 18);
  }

  #[test]
  fn capability_names_are_camel_case() {
    assert_eq!(Capability::EditOwnShift.to_string(), "editOwnShift");
    assert_eq!(
      "approveTimeOff".parse::<Capability>().unwrap(),
      Capability::ApproveTimeOff
    );
  }

  #[test]
  fn employee_may_edit_own_shift() {
    let table = PermissionTable::standard();
    let employee = user(7, Role::Employee);
    assert_eq!(table.authorize(&employee, Capability::EditShift, Some(7)), Ok(()));
  }

  #[test]
  fn employee_may_not_edit_someone_elses_shift() {
    let table = PermissionTable::standard();
    let employee = user(7, Role::Employee);
    assert_eq!(
      table.authorize(&employee, Capability::EditShift, Some(8)),
      Err(Denial::NotOwnResource { capability: Capability::EditShift })
    );
    assert_eq!(
      table.authorize(&employee, Capability::EditShift, None),
      Err(Denial::NotOwnResource { capability: Capability::EditShift })
    );
  }

  #[test]
  fn employee_may_not_delete_even_own_shift() {
    let table = PermissionTable::standard();
    let employee = user(7, Role::Employee);
    assert_eq!(
      table.authorize(&employee, Capability::DeleteShift, Some(7)),
      Err(Denial::NoPermission {
        role:       Role::Employee,
        capability: Capability::DeleteShift,
      })
    );
  }

  #[test]
  fn manager_cannot_create_departments() {
    let table = PermissionTable::standard();
    let manager = user(2, Role::Manager);
    assert!(matches!(
      table.authorize(&manager, Capability::CreateDepartment, None),
      Err(Denial::NoPermission { .. })
    ));
  }

  #[test]
  fn manager_row_matches_the_published_matrix() {
    let table = PermissionTable::standard();
    assert!(table.grants(Role::Manager, Capability::EditUser));
    assert!(!table.grants(Role::Manager, Capability::CreateUser));
    assert!(!table.grants(Role::Manager, Capability::DeleteUser));
    assert!(!table.grants(Role::Manager, Capability::EditDepartment));
    assert!(table.grants(Role::Manager, Capability::ApproveTimeOff));
    assert!(!table.grants(Role::Employee, Capability::ApproveTimeOff));
    assert!(!table.grants(Role::Employee, Capability::CreateShift));
  }

  #[test]
  fn custom_tables_are_isolated_from_the_standard_one() {
    let table = PermissionTable::new(HashMap::from([(
      Role::Employee,
      HashSet::from([Capability::DeleteShift]),
    )]));
    let employee = user(1, Role::Employee);
    let admin = user(2, Role::Admin);

    assert!(table.authorize(&employee, Capability::DeleteShift, None).is_ok());
    assert!(table.authorize(&admin, Capability::ViewUsers, None).is_err());
  }

  proptest! {
    #[test]
    fn admin_is_allowed_everything(
      capability in capability_strategy(),
      owner in proptest::option::of(1i64..100),
    ) {
      let table = PermissionTable::standard();
      let admin = user(1, Role::Admin);
      prop_assert!(table.authorize(&admin, capability, owner).is_ok());
    }

    #[test]
    fn granted_capabilities_ignore_the_owner(
      role in role_strategy(),
      capability in capability_strategy(),
      owner in proptest::option::of(1i64..100),
    ) {
      let table = PermissionTable::standard();
      let actor = user(50, role);
      if table.grants(role, capability) {
        prop_assert!(table.authorize(&actor, capability, owner).is_ok());
      }
    }

    #[test]
    fn own_shift_exception_applies_only_to_matching_owner(
      actor_id in 1i64..100,
      owner in proptest::option::of(1i64..100),
    ) {
      let table = PermissionTable::standard();
      let employee = user(actor_id, Role::Employee);
      let decision = table.authorize(&employee, Capability::EditShift, owner);
      prop_assert_eq!(decision.is_ok(), owner == Some(actor_id));
    }

    #[test]
    fn ungranted_capabilities_other_than_edit_shift_are_always_denied(
      role in role_strategy(),
      capability in capability_strategy(),
      owner in proptest::option::of(1i64..100),
    ) {
      let table = PermissionTable::standard();
      let actor = user(1, role);
      prop_assume!(capability != Capability::EditShift);
      prop_assume!(!table.grants(role, capability));
      prop_assert_eq!(
        table.authorize(&actor, capability, owner),
        Err(Denial::NoPermission { role, capability })
      );
    }
  }
}
