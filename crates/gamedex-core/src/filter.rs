//! Exact-match listing filters.
//!
//! A [`Filter`] keeps records whose field equals the given value. Text is
//! compared ignoring case; when both sides read as numbers they are
//! compared numerically, so `Released_Year=2006` matches `2006` and
//! `Units_Sold=101.6` matches `101.60`.

use crate::{
  fields::normalize_field_name,
  record::Record,
  validate::ValidationError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
  /// `(index into Record::FIELDS, wanted value)`
  terms: Vec<(usize, String)>,
}

impl Filter {
  /// Build a filter for `R` from query pairs. Keys are matched against
  /// [`Record::FILTERS`] by either name, after normalization. Blank values
  /// are ignored; unknown keys are rejected.
  pub fn parse<R, K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, ValidationError>
  where
    R: Record,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut terms = Vec::new();
    for (key, value) in pairs {
      let key = key.as_ref();
      let wanted = normalize_field_name(key);
      let field = R::FILTERS
        .iter()
        .find(|(query, field)| normalize_field_name(query) == wanted || normalize_field_name(field) == wanted)
        .map(|(_, field)| *field)
        .ok_or_else(|| ValidationError::new(key, "is not a filterable field"))?;

      let value = value.as_ref().trim();
      if value.is_empty() {
        continue;
      }
      if let Some(index) = R::FIELDS.iter().position(|f| *f == field) {
        terms.push((index, value.to_owned()));
      }
    }
    Ok(Self { terms })
  }

  pub fn is_empty(&self) -> bool { self.terms.is_empty() }

  pub fn matches<R: Record>(&self, record: &R) -> bool {
    if self.terms.is_empty() {
      return true;
    }
    let cells = record.to_fields();
    self.terms.iter().all(|(index, wanted)| {
      cells
        .get(*index)
        .and_then(Option::as_deref)
        .is_some_and(|cell| same_value(cell, wanted))
    })
  }
}

fn same_value(cell: &str, wanted: &str) -> bool {
  match (cell.parse::<f64>(), wanted.parse::<f64>()) {
    (Ok(a), Ok(b)) => a == b,
    _ => cell.to_lowercase() == wanted.to_lowercase(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{console::Console, game::Game};

  fn wii() -> Console {
    Console {
      name:                 "Wii".into(),
      kind:                 "Home".into(),
      company:              "Nintendo".into(),
      released_year:        2006,
      discontinuation_year: Some(2013),
      units_sold:           Some(101.6),
    }
  }

  #[test]
  fn text_ignores_case_and_numbers_compare_by_value() {
    let hit = Filter::parse::<Console, _, _>([("company", "NINTENDO"), ("Released_Year", "2006.0")]).unwrap();
    assert!(hit.matches(&wii()));

    let miss = Filter::parse::<Console, _, _>([("Units_Sold", "101")]).unwrap();
    assert!(!miss.matches(&wii()));
  }

  #[test]
  fn filters_are_exact_not_substring() {
    let f = Filter::parse::<Console, _, _>([("Console_Name", "wi")]).unwrap();
    assert!(!f.matches(&wii()));
  }

  #[test]
  fn query_alias_and_field_name_both_work() {
    assert!(!Filter::parse::<Game, _, _>([("title", "Tetris")]).unwrap().is_empty());
    assert!(!Filter::parse::<Game, _, _>([("Game_Title", "Tetris")]).unwrap().is_empty());
  }

  #[test]
  fn unknown_keys_are_rejected_and_blanks_ignored() {
    let err = Filter::parse::<Game, _, _>([("Publisher", "Acme")]).unwrap_err();
    assert_eq!(err.field, "Publisher");
    assert!(Filter::parse::<Game, _, _>([("genre", "  ")]).unwrap().is_empty());
  }
}
