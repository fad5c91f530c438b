//! The [`Record`] abstraction shared by games and consoles, and the stored
//! and archived envelopes that wrap a record with its identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  fields::{FieldError, RawFields},
  validate::ValidationError,
};

/// Which catalog a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
  Game,
  Console,
}

impl RecordKind {
  /// Human-facing singular, e.g. in `"Game not found"`.
  pub fn label(self) -> &'static str {
    match self {
      RecordKind::Game => "Game",
      RecordKind::Console => "Console",
    }
  }

  /// Lowercase plural, used for table names, file names and URL segments.
  pub fn plural(self) -> &'static str {
    match self {
      RecordKind::Game => "games",
      RecordKind::Console => "consoles",
    }
  }
}

impl fmt::Display for RecordKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// A catalog entity without its surrogate id.
///
/// Implementations define how the record validates itself, how a partial
/// update applies to it, and how it is read from and written to named string
/// cells (CSV rows, HTML forms).
pub trait Record:
  Clone + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static
{
  /// A set of typed field changes; see [`Record::apply`].
  type Patch: Clone + fmt::Debug + Send + Sync + 'static;

  const KIND: RecordKind;

  /// Canonical field names, in storage column order.
  const FIELDS: &'static [&'static str];

  /// Fields a listing may be filtered on, as `(query name, field name)`.
  const FILTERS: &'static [(&'static str, &'static str)];

  /// Check every bound. Called before any write reaches a store.
  fn validate(&self) -> Result<(), ValidationError>;

  /// Parse a JSON object into a patch. Keys outside the allow-list, and
  /// values of the wrong type, are rejected.
  fn parse_patch(body: &Map<String, Value>) -> Result<Self::Patch, ValidationError>;

  /// A patch that overwrites every field with this record's values.
  fn into_patch(self) -> Self::Patch;

  /// Overwrite exactly the fields carried by `patch`.
  fn apply(&mut self, patch: &Self::Patch);

  /// Read a record from named cells. Blank cells are absent.
  fn from_fields(fields: &RawFields) -> Result<Self, FieldError>;

  /// Cells in [`Record::FIELDS`] order; `None` writes an empty cell.
  fn to_fields(&self) -> Vec<Option<String>>;

  /// The text matched by catalog search (title or name).
  fn search_text(&self) -> &str;
}

/// A record as held by a record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored<R> {
  pub id:     i64,
  #[serde(flatten)]
  pub record: R,
}

/// A record moved to the archive. `id` is the id it had while active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Archived<R> {
  pub id:          i64,
  #[serde(flatten)]
  pub record:      R,
  pub archived_at: DateTime<Utc>,
}

impl<R> Archived<R> {
  pub fn new(stored: Stored<R>, archived_at: DateTime<Utc>) -> Self {
    Self { id: stored.id, record: stored.record, archived_at }
  }
}

/// Offset pagination over a store listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
  #[serde(default)]
  pub skip:  u64,
  #[serde(default = "Page::default_limit")]
  pub limit: u64,
}

impl Page {
  pub const DEFAULT_LIMIT: u64 = 100;

  fn default_limit() -> u64 { Self::DEFAULT_LIMIT }

  /// The 1-based `page` of `per_page` items. Offsets past `u64::MAX`
  /// saturate, which reads as an empty page.
  pub fn numbered(page: u64, per_page: u64) -> Self {
    Self { skip: page.saturating_sub(1).saturating_mul(per_page), limit: per_page }
  }
}

impl Default for Page {
  fn default() -> Self { Self { skip: 0, limit: Self::DEFAULT_LIMIT } }
}

/// Number of pages needed to show `total` items `per_page` at a time.
pub fn page_count(total: u64, per_page: u64) -> u64 {
  if per_page == 0 { 0 } else { total.div_ceil(per_page) }
}

/// Format an optional float cell.
pub(crate) fn float_cell(value: Option<f64>) -> Option<String> { value.map(|v| v.to_string()) }
