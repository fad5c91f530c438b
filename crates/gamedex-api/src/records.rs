//! Handlers for `/games` and `/consoles`, written once over [`Record`].
//!
//! | Method  | Path                  | Notes                              |
//! |---------|-----------------------|------------------------------------|
//! | `GET`   | `/{kind}`             | `?skip=&limit=` and field filters  |
//! | `POST`  | `/{kind}`             | Full record body; 201              |
//! | `GET`   | `/{kind}/search`      | `?q=` substring of title or name   |
//! | `GET`   | `/{kind}/archived`    | Archived copies, oldest first      |
//! | `GET`   | `/{kind}/{id}`        | 404 if not found                   |
//! | `PUT`   | `/{kind}/{id}`        | Full record body; replaces it      |
//! | `PATCH` | `/{kind}/{id}`        | Partial body; unknown keys are 400 |
//! | `POST`  | `/{kind}/{id}/archive`| Moves the record to the archive    |
//!
//! Any other `GET /{kind}` parameter names a field to filter on, e.g.
//! `/games?genre=action&platform=wii` or `/consoles?Released_Year=2006`.
//! Filters match whole values, ignoring case. Unknown names are 400.

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use gamedex_core::{
  filter::Filter,
  record::{Archived, Page, Record, Stored},
  store::{ArchiveStore, RecordStore},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{AppState, error::ApiError};

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Split `skip` and `limit` out of the query; the rest are filters.
fn split_page(pairs: Vec<(String, String)>) -> Result<(Page, Vec<(String, String)>), ApiError> {
  let mut page = Page::default();
  let mut rest = Vec::new();
  for (key, value) in pairs {
    let slot = match key.as_str() {
      "skip" => &mut page.skip,
      "limit" => &mut page.limit,
      _ => {
        rest.push((key, value));
        continue;
      }
    };
    *slot = value
      .trim()
      .parse()
      .map_err(|_| ApiError::BadRequest(format!("{key} must be a non-negative integer, got {value:?}")))?;
  }
  Ok((page, rest))
}

/// `GET /{kind}?skip=&limit=&<field>=<value>...`
pub async fn list<S, R>(
  State(state): State<Arc<AppState<S>>>,
  query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Stored<R>>>, ApiError>
where
  S: RecordStore<R> + 'static,
  R: Record,
{
  let Query(pairs) = query?;
  let (page, rest) = split_page(pairs)?;
  let filter = Filter::parse::<R, _, _>(rest).map_err(gamedex_core::Error::from)?;
  Ok(Json(state.catalog.list_filtered::<R>(&filter, page).await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /{kind}/search?q=`
pub async fn search<S, R>(
  State(state): State<Arc<AppState<S>>>,
  query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Stored<R>>>, ApiError>
where
  S: RecordStore<R> + 'static,
  R: Record,
{
  let Query(params) = query?;
  Ok(Json(state.catalog.search::<R>(&params.q).await?))
}

/// `GET /{kind}/{id}`
pub async fn get_one<S, R>(
  State(state): State<Arc<AppState<S>>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Stored<R>>, ApiError>
where
  S: RecordStore<R> + 'static,
  R: Record,
{
  let Path(id) = id?;
  Ok(Json(state.catalog.get::<R>(id).await?))
}

/// `GET /{kind}/archived`
pub async fn archived<S, R>(
  State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Archived<R>>>, ApiError>
where
  S: ArchiveStore<R> + 'static,
  R: Record,
{
  Ok(Json(state.catalog.list_archived::<R>().await?))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /{kind}` with every required field in the body.
pub async fn create<S, R>(
  State(state): State<Arc<AppState<S>>>,
  body: Result<Json<R>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore<R> + 'static,
  R: Record + DeserializeOwned,
{
  let Json(record) = body?;
  let stored = state.catalog.create(record).await?;
  Ok((StatusCode::CREATED, Json(stored)))
}

/// `PUT /{kind}/{id}` with every required field in the body. Optional
/// fields left out of the body are cleared.
pub async fn replace<S, R>(
  State(state): State<Arc<AppState<S>>>,
  id: Result<Path<i64>, PathRejection>,
  body: Result<Json<R>, JsonRejection>,
) -> Result<Json<Stored<R>>, ApiError>
where
  S: RecordStore<R> + 'static,
  R: Record + DeserializeOwned,
{
  let Path(id) = id?;
  let Json(record) = body?;
  Ok(Json(state.catalog.update::<R>(id, record.into_patch()).await?))
}

/// `PATCH /{kind}/{id}` with any subset of the record's fields.
pub async fn update<S, R>(
  State(state): State<Arc<AppState<S>>>,
  id: Result<Path<i64>, PathRejection>,
  body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Stored<R>>, ApiError>
where
  S: RecordStore<R> + 'static,
  R: Record,
{
  let Path(id) = id?;
  let Json(fields) = body?;
  Ok(Json(state.catalog.update_json::<R>(id, &fields).await?))
}

/// `POST /{kind}/{id}/archive`
pub async fn archive<S, R>(
  State(state): State<Arc<AppState<S>>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Archived<R>>, ApiError>
where
  S: RecordStore<R> + ArchiveStore<R> + 'static,
  R: Record,
{
  let Path(id) = id?;
  Ok(Json(state.catalog.archive_and_remove::<R>(id).await?))
}
