//! Encoding and decoding helpers between Rust domain types and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings. Each record type maps its
//! fields onto the columns named in [`Record::FIELDS`], in that order.

use chrono::{DateTime, Utc};
use gamedex_core::{
  console::Console,
  game::Game,
  record::Record,
};
use rusqlite::{Row, types::Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Values ──────────────────────────────────────────────────────────────────

fn opt_int(v: Option<i32>) -> Value { v.map_or(Value::Null, |v| Value::Integer(v.into())) }

fn opt_real(v: Option<f64>) -> Value { v.map_or(Value::Null, Value::Real) }

fn opt_text(v: Option<&str>) -> Value { v.map_or(Value::Null, |s| Value::Text(s.to_owned())) }

fn text(s: &str) -> Value { Value::Text(s.to_owned()) }

// ─── Record mapping ──────────────────────────────────────────────────────────

/// A [`Record`] with a SQLite table layout.
pub trait SqlRecord: Record {
  const TABLE: &'static str;
  const ARCHIVE_TABLE: &'static str;
  /// Column matched by `search`.
  const SEARCH_COLUMN: &'static str;

  /// Bind values in [`Record::FIELDS`] order.
  fn params(&self) -> Vec<Value>;

  /// Read the record from `row`, starting at column `offset`.
  fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;
}

impl SqlRecord for Game {
  const TABLE: &'static str = "games";
  const ARCHIVE_TABLE: &'static str = "archived_games";
  const SEARCH_COLUMN: &'static str = "Game_Title";

  fn params(&self) -> Vec<Value> {
    vec![
      Value::Integer(self.rank.into()),
      text(&self.title),
      text(&self.platform),
      opt_int(self.year),
      text(&self.genre),
      text(&self.publisher),
      opt_real(self.north_america),
      opt_real(self.europe),
      opt_real(self.japan),
      opt_real(self.rest_of_world),
      Value::Real(self.global),
      opt_text(self.review.as_deref()),
    ]
  }

  fn read(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
    Ok(Game {
      rank:          row.get(o)?,
      title:         row.get(o + 1)?,
      platform:      row.get(o + 2)?,
      year:          row.get(o + 3)?,
      genre:         row.get(o + 4)?,
      publisher:     row.get(o + 5)?,
      north_america: row.get(o + 6)?,
      europe:        row.get(o + 7)?,
      japan:         row.get(o + 8)?,
      rest_of_world: row.get(o + 9)?,
      global:        row.get(o + 10)?,
      review:        row.get(o + 11)?,
    })
  }
}

impl SqlRecord for Console {
  const TABLE: &'static str = "consoles";
  const ARCHIVE_TABLE: &'static str = "archived_consoles";
  const SEARCH_COLUMN: &'static str = "Console_Name";

  fn params(&self) -> Vec<Value> {
    vec![
      text(&self.name),
      text(&self.kind),
      text(&self.company),
      Value::Integer(self.released_year.into()),
      opt_int(self.discontinuation_year),
      opt_real(self.units_sold),
    ]
  }

  fn read(row: &Row<'_>, o: usize) -> rusqlite::Result<Self> {
    Ok(Console {
      name:                 row.get(o)?,
      kind:                 row.get(o + 1)?,
      company:              row.get(o + 2)?,
      released_year:        row.get(o + 3)?,
      discontinuation_year: row.get(o + 4)?,
      units_sold:           row.get(o + 5)?,
    })
  }
}

// ─── SQL text ────────────────────────────────────────────────────────────────

/// `"Rank", "Game_Title", …`
pub fn columns<R: Record>() -> String {
  R::FIELDS
    .iter()
    .map(|f| format!("\"{f}\""))
    .collect::<Vec<_>>()
    .join(", ")
}

/// `?1, ?2, …, ?n`
pub fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

/// `"Rank" = ?1, "Game_Title" = ?2, …`
pub fn assignments<R: Record>() -> String {
  R::FIELDS
    .iter()
    .enumerate()
    .map(|(i, f)| format!("\"{f}\" = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ")
}

/// Escape `%`, `_` and `\` for a `LIKE … ESCAPE '\'` pattern.
pub fn like_pattern(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len() + 2);
  escaped.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// An archived row with its timestamp still encoded.
pub struct RawArchived<R> {
  pub id:          i64,
  pub record:      R,
  pub archived_at: String,
}

impl<R> RawArchived<R> {
  pub fn into_archived(self) -> Result<gamedex_core::record::Archived<R>> {
    Ok(gamedex_core::record::Archived {
      id:          self.id,
      record:      self.record,
      archived_at: decode_dt(&self.archived_at)?,
    })
  }
}

/// Raw values read directly from a `subscribers` row.
pub struct RawSubscriber {
  pub id:            i64,
  pub email:         String,
  pub subscribed_at: String,
}

impl RawSubscriber {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSubscriber {
      id:            row.get(0)?,
      email:         row.get(1)?,
      subscribed_at: row.get(2)?,
    })
  }

  pub fn into_subscriber(self) -> Result<gamedex_core::subscriber::Subscriber> {
    Ok(gamedex_core::subscriber::Subscriber {
      id:            self.id,
      email:         self.email,
      subscribed_at: decode_dt(&self.subscribed_at)?,
    })
  }
}
