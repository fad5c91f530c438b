//! Typed readers for partial-update payloads.
//!
//! A patch arrives as a JSON object. Each record type maps the keys it
//! allows onto a typed change using these readers; any other key is
//! rejected. For optional fields an explicit `null` clears the value, for
//! required fields it is an error.

use serde_json::{Map, Value};

use crate::validate::{Result, ValidationError};

/// One key/value pair of a patch body.
pub struct Entry<'a> {
  pub key:   &'a str,
  pub value: &'a Value,
}

/// Iterate a patch body in key order.
pub fn entries(body: &Map<String, Value>) -> impl Iterator<Item = Entry<'_>> {
  body.iter().map(|(key, value)| Entry { key, value })
}

impl Entry<'_> {
  fn invalid(&self, expected: &str) -> ValidationError {
    ValidationError::new(self.key, format!("expected {expected}, got {}", self.value))
  }

  pub fn text(&self) -> Result<String> {
    self.opt_text()?.ok_or_else(|| self.invalid("a string"))
  }

  pub fn opt_text(&self) -> Result<Option<String>> {
    match self.value {
      Value::Null => Ok(None),
      Value::String(s) => Ok(Some(s.clone())),
      _ => Err(self.invalid("a string")),
    }
  }

  pub fn int<T: TryFrom<i64>>(&self) -> Result<T> {
    self.opt_int()?.ok_or_else(|| self.invalid("an integer"))
  }

  pub fn opt_int<T: TryFrom<i64>>(&self) -> Result<Option<T>> {
    match self.value {
      Value::Null => Ok(None),
      Value::Number(n) => n
        .as_i64()
        .and_then(|n| T::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| self.invalid("an integer in range")),
      _ => Err(self.invalid("an integer")),
    }
  }

  pub fn float(&self) -> Result<f64> {
    self.opt_float()?.ok_or_else(|| self.invalid("a number"))
  }

  pub fn opt_float(&self) -> Result<Option<f64>> {
    match self.value {
      Value::Null => Ok(None),
      Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| self.invalid("a number")),
      _ => Err(self.invalid("a number")),
    }
  }

  pub fn unknown(&self) -> ValidationError { ValidationError::unknown_field(self.key) }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn body(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }

  #[test]
  fn null_clears_optional_but_not_required() {
    let b = body(json!({ "Year": null }));
    let entry = entries(&b).next().unwrap();
    assert_eq!(entry.opt_int::<i32>(), Ok(None));
    assert!(entry.int::<i32>().is_err());
  }

  #[test]
  fn type_mismatch_names_the_key() {
    let b = body(json!({ "Rank": "one" }));
    let err = entries(&b).next().unwrap().int::<u32>().unwrap_err();
    assert_eq!(err.field, "Rank");
  }

  #[test]
  fn negative_into_unsigned_is_rejected() {
    let b = body(json!({ "Rank": -1 }));
    assert!(entries(&b).next().unwrap().int::<u32>().is_err());
  }

  #[test]
  fn integers_are_accepted_as_floats() {
    let b = body(json!({ "Global": 2 }));
    assert_eq!(entries(&b).next().unwrap().float(), Ok(2.0));
  }
}
