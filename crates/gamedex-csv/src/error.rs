//! Error types for the gamedex-csv codec.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("line {line}: quoted field is never closed")]
  UnterminatedQuote { line: usize },

  #[error("line {line}: unexpected character after closing quote")]
  TrailingCharacter { line: usize },
}

impl Error {
  /// The 1-based line the offending row starts on.
  pub fn line(&self) -> usize {
    match self {
      Error::UnterminatedQuote { line } | Error::TrailingCharacter { line } => *line,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
