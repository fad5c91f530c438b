//! `POST /import`: bulk-load games and/or consoles from CSV files on the
//! server's filesystem.
//!
//! Body: `{"games": "data/games.csv", "consoles": "data/consoles.csv"}`;
//! either key may be omitted. Responds 200 with one summary per requested
//! kind. Row failures and unreadable files are reported inside the
//! summaries, not as HTTP errors.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use gamedex_core::{console::Console, game::Game, store::Backend};
use gamedex_import::ImportSummary;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportBody {
  pub games:    Option<PathBuf>,
  pub consoles: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub games:    Option<ImportSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub consoles: Option<ImportSummary>,
}

pub async fn handler<S: Backend>(
  State(state): State<Arc<AppState<S>>>,
  body: Result<Json<ImportBody>, JsonRejection>,
) -> Result<Json<ImportReport>, ApiError> {
  let Json(body) = body?;
  if body.games.is_none() && body.consoles.is_none() {
    return Err(ApiError::BadRequest("nothing to import: give `games` and/or `consoles`".into()));
  }

  let games = match body.games {
    Some(path) => Some(state.importer.import_path::<Game>(path).await),
    None => None,
  };
  let consoles = match body.consoles {
    Some(path) => Some(state.importer.import_path::<Console>(path).await),
    None => None,
  };

  Ok(Json(ImportReport { games, consoles }))
}
