//! Runtime configuration, layered from `config.toml` and `ROTA_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Which [`rota_core::store::RosterStore`] implementation to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Volatile; everything is lost on restart.
  Memory,
  #[default]
  Sqlite,
}

/// A department created on first start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedDepartment {
  pub name:  String,
  pub color: String,
}

/// Runtime server configuration. Every field has a default, so an empty
/// configuration is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub backend:          Backend,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path:       PathBuf,
  pub admin_username:   String,
  pub admin_password:   String,
  pub seed_departments: Vec<SeedDepartment>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_owned(),
      port:             3000,
      backend:          Backend::default(),
      store_path:       PathBuf::from("rota.db"),
      admin_username:   "admin".to_owned(),
      admin_password:   "admin".to_owned(),
      seed_departments: Vec::new(),
    }
  }
}

impl ServerConfig {
  /// Load `file` (optional) overlaid with `ROTA_*` environment variables.
  pub fn load(file: &Path) -> Result<Self, ::config::ConfigError> {
    ::config::Config::builder()
      .add_source(::config::File::from(file).required(false))
      .add_source(::config::Environment::with_prefix("ROTA"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
