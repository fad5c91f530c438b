//! Game records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  fields::{FieldError, RawFields},
  patch,
  record::{Record, RecordKind, float_cell},
  validate::{self, ValidationError},
};

pub const TITLE_MAX: usize = 500;
pub const PLATFORM_MAX: usize = 50;
pub const GENRE_MAX: usize = 500;
pub const PUBLISHER_MAX: usize = 500;
pub const REVIEW_MAX: usize = 100;

/// A game and its sales figures (millions of units).
///
/// `rank` is a business attribute, not a key: two games may share a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Game {
  #[serde(rename = "Rank")]
  pub rank:          u32,
  #[serde(rename = "Game_Title")]
  pub title:         String,
  #[serde(rename = "Platform")]
  pub platform:      String,
  #[serde(rename = "Year", default)]
  pub year:          Option<i32>,
  #[serde(rename = "Genre")]
  pub genre:         String,
  #[serde(rename = "Publisher")]
  pub publisher:     String,
  #[serde(rename = "North_America", default)]
  pub north_america: Option<f64>,
  #[serde(rename = "Europe", default)]
  pub europe:        Option<f64>,
  #[serde(rename = "Japan", default)]
  pub japan:         Option<f64>,
  #[serde(rename = "Rest_of_World", default)]
  pub rest_of_world: Option<f64>,
  #[serde(rename = "Global")]
  pub global:        f64,
  #[serde(rename = "Review", default)]
  pub review:        Option<String>,
}

/// One field overwrite. `None` in an optional field clears it.
#[derive(Debug, Clone, PartialEq)]
pub enum GameChange {
  Rank(u32),
  Title(String),
  Platform(String),
  Year(Option<i32>),
  Genre(String),
  Publisher(String),
  NorthAmerica(Option<f64>),
  Europe(Option<f64>),
  Japan(Option<f64>),
  RestOfWorld(Option<f64>),
  Global(f64),
  Review(Option<String>),
}

/// The fields supplied in a game update, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
  pub changes: Vec<GameChange>,
}

impl GamePatch {
  pub fn is_empty(&self) -> bool { self.changes.is_empty() }
}

impl From<Vec<GameChange>> for GamePatch {
  fn from(changes: Vec<GameChange>) -> Self { Self { changes } }
}

impl Record for Game {
  type Patch = GamePatch;

  const KIND: RecordKind = RecordKind::Game;
  const FIELDS: &'static [&'static str] = &[
    "Rank",
    "Game_Title",
    "Platform",
    "Year",
    "Genre",
    "Publisher",
    "North_America",
    "Europe",
    "Japan",
    "Rest_of_World",
    "Global",
    "Review",
  ];

  const FILTERS: &'static [(&'static str, &'static str)] = &[
    ("title", "Game_Title"),
    ("genre", "Genre"),
    ("platform", "Platform"),
  ];

  fn validate(&self) -> Result<(), ValidationError> {
    validate::text("Game_Title", &self.title, TITLE_MAX)?;
    validate::text("Platform", &self.platform, PLATFORM_MAX)?;
    validate::opt_year("Year", self.year)?;
    validate::text("Genre", &self.genre, GENRE_MAX)?;
    validate::text("Publisher", &self.publisher, PUBLISHER_MAX)?;
    validate::opt_non_negative("North_America", self.north_america)?;
    validate::opt_non_negative("Europe", self.europe)?;
    validate::opt_non_negative("Japan", self.japan)?;
    validate::opt_non_negative("Rest_of_World", self.rest_of_world)?;
    validate::non_negative("Global", self.global)?;
    validate::opt_text("Review", self.review.as_deref(), REVIEW_MAX)
  }

  fn parse_patch(body: &Map<String, Value>) -> Result<GamePatch, ValidationError> {
    let changes = patch::entries(body)
      .map(|e| {
        Ok(match e.key {
          "Rank" => GameChange::Rank(e.int()?),
          "Game_Title" => GameChange::Title(e.text()?),
          "Platform" => GameChange::Platform(e.text()?),
          "Year" => GameChange::Year(e.opt_int()?),
          "Genre" => GameChange::Genre(e.text()?),
          "Publisher" => GameChange::Publisher(e.text()?),
          "North_America" => GameChange::NorthAmerica(e.opt_float()?),
          "Europe" => GameChange::Europe(e.opt_float()?),
          "Japan" => GameChange::Japan(e.opt_float()?),
          "Rest_of_World" => GameChange::RestOfWorld(e.opt_float()?),
          "Global" => GameChange::Global(e.float()?),
          "Review" => GameChange::Review(e.opt_text()?),
          _ => return Err(e.unknown()),
        })
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(GamePatch { changes })
  }

  fn into_patch(self) -> GamePatch {
    GamePatch {
      changes: vec![
        GameChange::Rank(self.rank),
        GameChange::Title(self.title),
        GameChange::Platform(self.platform),
        GameChange::Year(self.year),
        GameChange::Genre(self.genre),
        GameChange::Publisher(self.publisher),
        GameChange::NorthAmerica(self.north_america),
        GameChange::Europe(self.europe),
        GameChange::Japan(self.japan),
        GameChange::RestOfWorld(self.rest_of_world),
        GameChange::Global(self.global),
        GameChange::Review(self.review),
      ],
    }
  }

  fn apply(&mut self, patch: &GamePatch) {
    for change in &patch.changes {
      match change.clone() {
        GameChange::Rank(v) => self.rank = v,
        GameChange::Title(v) => self.title = v,
        GameChange::Platform(v) => self.platform = v,
        GameChange::Year(v) => self.year = v,
        GameChange::Genre(v) => self.genre = v,
        GameChange::Publisher(v) => self.publisher = v,
        GameChange::NorthAmerica(v) => self.north_america = v,
        GameChange::Europe(v) => self.europe = v,
        GameChange::Japan(v) => self.japan = v,
        GameChange::RestOfWorld(v) => self.rest_of_world = v,
        GameChange::Global(v) => self.global = v,
        GameChange::Review(v) => self.review = v,
      }
    }
  }

  fn from_fields(fields: &RawFields) -> Result<Self, FieldError> {
    Ok(Game {
      rank:          fields.int("Rank")?,
      title:         fields.text("Game_Title")?,
      platform:      fields.text("Platform")?,
      year:          fields.opt_int("Year")?,
      genre:         fields.text("Genre")?,
      publisher:     fields.text("Publisher")?,
      north_america: fields.opt_float("North_America")?,
      europe:        fields.opt_float("Europe")?,
      japan:         fields.opt_float("Japan")?,
      rest_of_world: fields.opt_float("Rest_of_World")?,
      global:        fields.float("Global")?,
      review:        fields.opt_text("Review"),
    })
  }

  fn to_fields(&self) -> Vec<Option<String>> {
    vec![
      Some(self.rank.to_string()),
      Some(self.title.clone()),
      Some(self.platform.clone()),
      self.year.map(|y| y.to_string()),
      Some(self.genre.clone()),
      Some(self.publisher.clone()),
      float_cell(self.north_america),
      float_cell(self.europe),
      float_cell(self.japan),
      float_cell(self.rest_of_world),
      Some(self.global.to_string()),
      self.review.clone(),
    ]
  }

  fn search_text(&self) -> &str { &self.title }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn foo() -> Game {
    Game {
      rank:          1,
      title:         "Foo".into(),
      platform:      "PC".into(),
      year:          Some(2010),
      genre:         "Action".into(),
      publisher:     "Acme".into(),
      north_america: Some(1.0),
      europe:        Some(0.5),
      japan:         Some(0.1),
      rest_of_world: Some(0.2),
      global:        1.8,
      review:        Some("8.5".into()),
    }
  }

  fn object(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => unreachable!(),
    }
  }

  #[test]
  fn deserializes_from_canonical_json_names() {
    let game: Game = serde_json::from_value(json!({
      "Rank": 1, "Game_Title": "Foo", "Platform": "PC", "Year": 2010,
      "Genre": "Action", "Publisher": "Acme", "North_America": 1.0,
      "Europe": 0.5, "Japan": 0.1, "Rest_of_World": 0.2, "Global": 1.8,
      "Review": "8.5"
    }))
    .unwrap();
    assert_eq!(game, foo());
    assert!(game.validate().is_ok());
  }

  #[test]
  fn unknown_json_keys_are_rejected_on_create() {
    let res: Result<Game, _> = serde_json::from_value(json!({
      "Rank": 1, "Game_Title": "Foo", "Platform": "PC", "Genre": "Action",
      "Publisher": "Acme", "Global": 1.8, "Score": 10
    }));
    assert!(res.is_err());
  }

  #[test]
  fn validation_catches_bounds() {
    let mut game = foo();
    game.platform = "P".repeat(51);
    assert_eq!(game.validate().unwrap_err().field, "Platform");

    let mut game = foo();
    game.year = Some(2030);
    assert_eq!(game.validate().unwrap_err().field, "Year");

    let mut game = foo();
    game.europe = Some(-0.5);
    assert_eq!(game.validate().unwrap_err().field, "Europe");

    let mut game = foo();
    game.review = Some("x".repeat(101));
    assert_eq!(game.validate().unwrap_err().field, "Review");
  }

  #[test]
  fn patch_touches_only_supplied_fields() {
    let patch = Game::parse_patch(&object(json!({ "Platform": "PS5", "Review": null }))).unwrap();
    let mut game = foo();
    game.apply(&patch);

    let mut expected = foo();
    expected.platform = "PS5".into();
    expected.review = None;
    assert_eq!(game, expected);
  }

  #[test]
  fn patch_rejects_unknown_and_id_keys() {
    let err = Game::parse_patch(&object(json!({ "Score": 3 }))).unwrap_err();
    assert_eq!(err.field, "Score");
    let err = Game::parse_patch(&object(json!({ "id": 3 }))).unwrap_err();
    assert_eq!(err.field, "id");
  }

  #[test]
  fn patch_rejects_null_for_required_field() {
    assert!(Game::parse_patch(&object(json!({ "Game_Title": null }))).is_err());
  }

  #[test]
  fn full_patch_replaces_everything() {
    let mut replacement = foo();
    replacement.title = "Bar".into();
    replacement.year = None;
    let mut game = foo();
    game.apply(&replacement.clone().into_patch());
    assert_eq!(game, replacement);
  }

  #[test]
  fn fields_round_trip_through_cells() {
    let game = foo();
    let cells: Vec<String> = game.to_fields().into_iter().map(Option::unwrap_or_default).collect();
    let fields = RawFields::from_row(Game::FIELDS, &cells);
    assert_eq!(Game::from_fields(&fields).unwrap(), game);
  }

  #[test]
  fn missing_rank_is_a_missing_field() {
    let fields = RawFields::from_row(&["Game_Title", "Rank"], &["Foo", ""]);
    assert_eq!(Game::from_fields(&fields), Err(FieldError::Missing("Rank".into())));
  }
}
