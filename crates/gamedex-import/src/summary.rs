use gamedex_core::record::RecordKind;
use serde::Serialize;

use crate::Error;

/// One row that did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
  /// 1-based line the row starts on, counting the header.
  pub line:   usize,
  pub reason: String,
}

/// The outcome of one import call.
///
/// `total` counts data rows read (the header excluded); it always equals
/// `imported + failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
  pub kind:         RecordKind,
  pub total:        usize,
  pub imported:     usize,
  pub failed:       usize,
  pub failures:     Vec<RowFailure>,
  /// Set when the source could not be opened or decoded. Nothing was
  /// imported in that case.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source_error: Option<String>,
  /// Problems with the source that did not fail any row, such as header
  /// columns that clash after normalization.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub warnings:     Vec<String>,
}

impl ImportSummary {
  pub(crate) fn new(kind: RecordKind) -> Self {
    Self {
      kind,
      total: 0,
      imported: 0,
      failed: 0,
      failures: Vec::new(),
      source_error: None,
      warnings: Vec::new(),
    }
  }

  pub(crate) fn source_failed(kind: RecordKind, err: &Error) -> Self {
    Self { source_error: Some(err.to_string()), ..Self::new(kind) }
  }

  pub(crate) fn fail(&mut self, line: usize, err: &Error) {
    self.failed += 1;
    self.failures.push(RowFailure { line, reason: err.to_string() });
  }

  pub fn is_fatal(&self) -> bool { self.source_error.is_some() }
}
