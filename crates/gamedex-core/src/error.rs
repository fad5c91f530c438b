//! Error types for `gamedex-core`.

use thiserror::Error;

use crate::{record::RecordKind, validate::ValidationError};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{} not found", kind.label())]
  NotFound { kind: RecordKind, id: i64 },

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error, lifting uniqueness violations into
  /// [`Error::Conflict`].
  pub fn from_store<E: crate::store::StorageError>(err: E) -> Self {
    if err.is_conflict() {
      Error::Conflict(err.to_string())
    } else {
      Error::Store(Box::new(err))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
