//! Error type for `rota-store-sqlite`.

use rota_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rota_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
}

impl StoreError for Error {
  fn as_core(&self) -> Option<&rota_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      Error::Database(_) => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
