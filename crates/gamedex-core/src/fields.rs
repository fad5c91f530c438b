//! Untyped field access for tabular sources (CSV files, HTML forms).
//!
//! Column names are normalized with [`normalize_field_name`] on the way in
//! and on every lookup, so a record can read `Rest_of_World` from a column
//! headed `rest of world`.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Canonicalise a column name.
///
/// 1. trim surrounding whitespace;
/// 2. spaces and `-` become `_`, `.` is removed;
/// 3. split on `_`, dropping empty segments;
/// 4. each segment is capitalised (first character upper, rest lower);
/// 5. segments are joined with `_`.
///
/// `game title`, `Game_Title` and `GAME--TITLE` all become `Game_Title`.
pub fn normalize_field_name(raw: &str) -> String {
  raw
    .trim()
    .replace([' ', '-'], "_")
    .replace('.', "")
    .split('_')
    .filter(|segment| !segment.is_empty())
    .map(capitalize)
    .collect::<Vec<_>>()
    .join("_")
}

fn capitalize(segment: &str) -> String {
  let mut chars = segment.chars();
  match chars.next() {
    Some(first) => first
      .to_uppercase()
      .chain(chars.flat_map(char::to_lowercase))
      .collect(),
    None => String::new(),
  }
}

/// A field could not be read from a raw row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
  #[error("missing required field {0}")]
  Missing(String),

  #[error("field {field}: cannot parse {value:?} as {expected}")]
  Invalid {
    field:    String,
    value:    String,
    expected: &'static str,
  },
}

/// Header names that normalize to the same field as an earlier column, in
/// header order. Only the first such column is read.
pub fn duplicate_columns<H: AsRef<str>>(header: &[H]) -> Vec<String> {
  let mut seen = HashSet::new();
  header
    .iter()
    .map(|name| name.as_ref())
    .filter(|name| !seen.insert(normalize_field_name(name)))
    .map(str::to_owned)
    .collect()
}

/// Named string cells for one row.
///
/// Input from people (import files, forms) is trimmed on read. Rows a store
/// wrote itself are read [`verbatim`](Self::verbatim_row) so text keeps its
/// surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
  values:   HashMap<String, String>,
  verbatim: bool,
}

impl RawFields {
  pub fn new() -> Self { Self::default() }

  /// Build from parallel header and cell slices. Cells beyond the header are
  /// ignored; missing trailing cells read as absent. When two columns
  /// normalize to the same name the first one wins.
  pub fn from_row<H, C>(header: &[H], cells: &[C]) -> Self
  where
    H: AsRef<str>,
    C: AsRef<str>,
  {
    let mut fields = Self::new();
    for (name, value) in header.iter().zip(cells) {
      fields
        .values
        .entry(normalize_field_name(name.as_ref()))
        .or_insert_with(|| value.as_ref().to_owned());
    }
    fields
  }

  /// Like [`from_row`](Self::from_row), but cells are returned untrimmed.
  pub fn verbatim_row<H, C>(header: &[H], cells: &[C]) -> Self
  where
    H: AsRef<str>,
    C: AsRef<str>,
  {
    Self { verbatim: true, ..Self::from_row(header, cells) }
  }

  pub fn insert(&mut self, name: &str, value: impl Into<String>) {
    self.values.insert(normalize_field_name(name), value.into());
  }

  /// The cell, or `None` when it is missing or blank. Trimmed unless the
  /// fields were built with [`verbatim_row`](Self::verbatim_row).
  pub fn get(&self, name: &str) -> Option<&str> {
    let value = self.values.get(&normalize_field_name(name))?;
    let value = if self.verbatim { value.as_str() } else { value.trim() };
    Some(value).filter(|v| !v.is_empty())
  }

  pub fn text(&self, name: &str) -> Result<String, FieldError> {
    self
      .opt_text(name)
      .ok_or_else(|| FieldError::Missing(name.to_owned()))
  }

  pub fn opt_text(&self, name: &str) -> Option<String> {
    self.get(name).map(str::to_owned)
  }

  pub fn int<T: TryFrom<i64>>(&self, name: &str) -> Result<T, FieldError> {
    self
      .opt_int(name)?
      .ok_or_else(|| FieldError::Missing(name.to_owned()))
  }

  /// Integers also accept a float with no fractional part (`2010.0`), which
  /// is how spreadsheet exports write integer columns containing blanks.
  pub fn opt_int<T: TryFrom<i64>>(&self, name: &str) -> Result<Option<T>, FieldError> {
    let Some(raw) = self.get(name).map(str::trim) else { return Ok(None) };
    let invalid = || FieldError::Invalid {
      field:    name.to_owned(),
      value:    raw.to_owned(),
      expected: "an integer",
    };

    let wide = match raw.parse::<i64>() {
      Ok(n) => n,
      Err(_) => {
        let f = raw.parse::<f64>().map_err(|_| invalid())?;
        if !f.is_finite() || f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
          return Err(invalid());
        }
        f as i64
      }
    };
    T::try_from(wide).map(Some).map_err(|_| invalid())
  }

  pub fn float(&self, name: &str) -> Result<f64, FieldError> {
    self
      .opt_float(name)?
      .ok_or_else(|| FieldError::Missing(name.to_owned()))
  }

  pub fn opt_float(&self, name: &str) -> Result<Option<f64>, FieldError> {
    let Some(raw) = self.get(name).map(str::trim) else { return Ok(None) };
    match raw.parse::<f64>() {
      Ok(f) if f.is_finite() => Ok(Some(f)),
      _ => Err(FieldError::Invalid {
        field:    name.to_owned(),
        value:    raw.to_owned(),
        expected: "a number",
      }),
    }
  }
}
