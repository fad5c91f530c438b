//! Error type for `gamedex-store-csv`.

use std::path::PathBuf;

use gamedex_core::store::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("I/O error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{file}: {source}")]
  Csv {
    file:   String,
    #[source]
    source: gamedex_csv::Error,
  },

  /// A row that parses as CSV but not as a stored record.
  #[error("{file} line {line}: {reason}")]
  Corrupt {
    file:   String,
    line:   usize,
    reason: String,
  },

  #[error("{0} is already subscribed")]
  Duplicate(String),
}

impl StorageError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Error::Duplicate(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
