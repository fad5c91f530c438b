//! Console records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  fields::{FieldError, RawFields},
  patch,
  record::{Record, RecordKind, float_cell},
  validate::{self, ValidationError},
};

pub const NAME_MAX: usize = 50;
pub const TYPE_MAX: usize = 50;
pub const COMPANY_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Console {
  #[serde(rename = "Console_Name")]
  pub name:                 String,
  #[serde(rename = "Type")]
  pub kind:                 String,
  #[serde(rename = "Company")]
  pub company:              String,
  #[serde(rename = "Released_Year")]
  pub released_year:        i32,
  #[serde(rename = "Discontinuation_Year", default)]
  pub discontinuation_year: Option<i32>,
  /// Millions of units.
  #[serde(rename = "Units_Sold", default)]
  pub units_sold:           Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleChange {
  Name(String),
  Kind(String),
  Company(String),
  ReleasedYear(i32),
  DiscontinuationYear(Option<i32>),
  UnitsSold(Option<f64>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolePatch {
  pub changes: Vec<ConsoleChange>,
}

impl ConsolePatch {
  pub fn is_empty(&self) -> bool { self.changes.is_empty() }
}

impl From<Vec<ConsoleChange>> for ConsolePatch {
  fn from(changes: Vec<ConsoleChange>) -> Self { Self { changes } }
}

impl Record for Console {
  type Patch = ConsolePatch;

  const KIND: RecordKind = RecordKind::Console;
  const FIELDS: &'static [&'static str] = &[
    "Console_Name",
    "Type",
    "Company",
    "Released_Year",
    "Discontinuation_Year",
    "Units_Sold",
  ];

  const FILTERS: &'static [(&'static str, &'static str)] = &[
    ("Console_Name", "Console_Name"),
    ("Company", "Company"),
    ("Released_Year", "Released_Year"),
    ("Units_Sold", "Units_Sold"),
  ];

  fn validate(&self) -> Result<(), ValidationError> {
    validate::text("Console_Name", &self.name, NAME_MAX)?;
    validate::text("Type", &self.kind, TYPE_MAX)?;
    validate::text("Company", &self.company, COMPANY_MAX)?;
    validate::year("Released_Year", self.released_year)?;
    validate::opt_year("Discontinuation_Year", self.discontinuation_year)?;
    if let Some(end) = self.discontinuation_year
      && end < self.released_year
    {
      return Err(ValidationError::new(
        "Discontinuation_Year",
        format!("must not be before Released_Year ({})", self.released_year),
      ));
    }
    validate::opt_non_negative("Units_Sold", self.units_sold)
  }

  fn parse_patch(body: &Map<String, Value>) -> Result<ConsolePatch, ValidationError> {
    let changes = patch::entries(body)
      .map(|e| {
        Ok(match e.key {
          "Console_Name" => ConsoleChange::Name(e.text()?),
          "Type" => ConsoleChange::Kind(e.text()?),
          "Company" => ConsoleChange::Company(e.text()?),
          "Released_Year" => ConsoleChange::ReleasedYear(e.int()?),
          "Discontinuation_Year" => ConsoleChange::DiscontinuationYear(e.opt_int()?),
          "Units_Sold" => ConsoleChange::UnitsSold(e.opt_float()?),
          _ => return Err(e.unknown()),
        })
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(ConsolePatch { changes })
  }

  fn into_patch(self) -> ConsolePatch {
    ConsolePatch {
      changes: vec![
        ConsoleChange::Name(self.name),
        ConsoleChange::Kind(self.kind),
        ConsoleChange::Company(self.company),
        ConsoleChange::ReleasedYear(self.released_year),
        ConsoleChange::DiscontinuationYear(self.discontinuation_year),
        ConsoleChange::UnitsSold(self.units_sold),
      ],
    }
  }

  fn apply(&mut self, patch: &ConsolePatch) {
    for change in &patch.changes {
      match change.clone() {
        ConsoleChange::Name(v) => self.name = v,
        ConsoleChange::Kind(v) => self.kind = v,
        ConsoleChange::Company(v) => self.company = v,
        ConsoleChange::ReleasedYear(v) => self.released_year = v,
        ConsoleChange::DiscontinuationYear(v) => self.discontinuation_year = v,
        ConsoleChange::UnitsSold(v) => self.units_sold = v,
      }
    }
  }

  fn from_fields(fields: &RawFields) -> Result<Self, FieldError> {
    Ok(Console {
      name:                 fields.text("Console_Name")?,
      kind:                 fields.text("Type")?,
      company:              fields.text("Company")?,
      released_year:        fields.int("Released_Year")?,
      discontinuation_year: fields.opt_int("Discontinuation_Year")?,
      units_sold:           fields.opt_float("Units_Sold")?,
    })
  }

  fn to_fields(&self) -> Vec<Option<String>> {
    vec![
      Some(self.name.clone()),
      Some(self.kind.clone()),
      Some(self.company.clone()),
      Some(self.released_year.to_string()),
      self.discontinuation_year.map(|y| y.to_string()),
      float_cell(self.units_sold),
    ]
  }

  fn search_text(&self) -> &str { &self.name }
}
