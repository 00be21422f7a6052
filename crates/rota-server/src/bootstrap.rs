//! First-start seeding: an admin account and the configured departments.

use rota_core::{
  department::NewDepartment,
  rules,
  store::RosterStore,
  user::{NewUser, Role},
};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// What [`bootstrap`] created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Seeded {
  pub admin:       bool,
  pub departments: usize,
}

/// Seed an empty store. A store that already has users is left alone.
///
/// Departments whose name already exists are skipped.
pub async fn bootstrap<S: RosterStore>(store: &S, cfg: &ServerConfig) -> Result<Seeded, S::Error> {
  if !store.list_users().await?.is_empty() {
    return Ok(Seeded::default());
  }

  let admin = NewUser::new(
    cfg.admin_username.clone(),
    cfg.admin_password.clone(),
    "Rota",
    "Admin",
    Role::Admin,
  );
  let admin = rules::create_user(store, None, admin).await?.value;
  warn!(
    username = %admin.username,
    "created bootstrap admin; change its password"
  );

  let mut departments = 0;
  for seed in &cfg.seed_departments {
    if store.get_department_by_name(seed.name.clone()).await?.is_some() {
      continue;
    }
    let input = NewDepartment::new(seed.name.clone(), seed.color.clone());
    rules::create_department(store, Some(admin.id), input).await?;
    departments += 1;
  }
  info!(departments, "bootstrap complete");

  Ok(Seeded { admin: true, departments })
}
