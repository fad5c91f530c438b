//! Error types for `gamedex-import`.
//!
//! None of these escape [`Importer`](crate::Importer): row errors become
//! [`RowFailure`](crate::RowFailure)s and source errors end up in
//! [`ImportSummary::source_error`](crate::ImportSummary::source_error).

use std::path::PathBuf;

use gamedex_core::{fields::FieldError, validate::ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read {}: {source}", path.display())]
  Source {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("source has no header row")]
  NoHeader,

  #[error("malformed CSV: {0}")]
  Csv(#[from] gamedex_csv::Error),

  #[error("{0}")]
  Field(#[from] FieldError),

  #[error("{0}")]
  Validation(#[from] ValidationError),

  #[error("batch insert failed: {0}")]
  Flush(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
