//! Boundary validation shared by every record type.
//!
//! Validation runs before anything reaches a store. Stores assume their
//! input already satisfies these bounds.

use std::fmt;

use serde::Serialize;

/// Exclusive upper bound for every year field.
pub const YEAR_LIMIT: i32 = 2030;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
  pub field:   String,
  pub message: String,
}

impl ValidationError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }

  pub fn unknown_field(field: &str) -> Self {
    Self::new(field, "is not a patchable field")
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.message)
  }
}

impl std::error::Error for ValidationError {}

pub type Result<T = (), E = ValidationError> = std::result::Result<T, E>;

/// Require between 1 and `max` characters, not all of them whitespace.
pub fn text(field: &str, value: &str, max: usize) -> Result {
  if value.trim().is_empty() {
    return Err(ValidationError::new(field, "must not be empty"));
  }
  let len = value.chars().count();
  if len > max {
    return Err(ValidationError::new(
      field,
      format!("must be at most {max} characters (got {len})"),
    ));
  }
  Ok(())
}

pub fn opt_text(field: &str, value: Option<&str>, max: usize) -> Result {
  value.map_or(Ok(()), |v| text(field, v, max))
}

/// Require a year in `[0, YEAR_LIMIT)`.
pub fn year(field: &str, value: i32) -> Result {
  if (0..YEAR_LIMIT).contains(&value) {
    Ok(())
  } else {
    Err(ValidationError::new(
      field,
      format!("must be between 0 and {} (got {value})", YEAR_LIMIT - 1),
    ))
  }
}

pub fn opt_year(field: &str, value: Option<i32>) -> Result {
  value.map_or(Ok(()), |v| year(field, v))
}

/// Require a finite, non-negative number.
pub fn non_negative(field: &str, value: f64) -> Result {
  if value.is_finite() && value >= 0.0 {
    Ok(())
  } else {
    Err(ValidationError::new(field, format!("must be a non-negative number (got {value})")))
  }
}

pub fn opt_non_negative(field: &str, value: Option<f64>) -> Result {
  value.map_or(Ok(()), |v| non_negative(field, v))
}

/// Minimal shape check: an `@` and a `.` somewhere in the address.
pub fn email(value: &str) -> Result {
  if value.contains('@') && value.contains('.') {
    Ok(())
  } else {
    Err(ValidationError::new("email", "is not a valid email address"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_bounds_count_characters_not_bytes() {
    assert!(text("Platform", "PS5", 50).is_ok());
    assert!(text("Platform", "", 50).is_err());
    assert!(text("Platform", "   ", 50).is_err());
    assert!(text("Platform", " PS5 ", 50).is_ok());
    assert!(text("Platform", &"é".repeat(50), 50).is_ok());
    assert!(text("Platform", &"é".repeat(51), 50).is_err());
  }

  #[test]
  fn year_is_half_open() {
    assert!(year("Year", 0).is_ok());
    assert!(year("Year", 2029).is_ok());
    assert!(year("Year", 2030).is_err());
    assert!(year("Year", -1).is_err());
  }

  #[test]
  fn non_negative_rejects_nan() {
    assert!(non_negative("Global", 0.0).is_ok());
    assert!(non_negative("Global", -0.1).is_err());
    assert!(non_negative("Global", f64::NAN).is_err());
  }

  #[test]
  fn email_shape() {
    assert!(email("a@b.co").is_ok());
    assert!(email("ab.co").is_err());
    assert!(email("a@bco").is_err());
  }
}
