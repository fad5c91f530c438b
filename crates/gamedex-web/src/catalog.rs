//! Catalog pages for games and consoles, written once over [`Listing`].
//!
//! | Method | Path                    | Notes                                   |
//! |--------|-------------------------|-----------------------------------------|
//! | `GET`  | `/{kind}`               | `?page=N`; 20 games or 10 consoles each |
//! | `GET`  | `/{kind}/search`        | `?q=`                                   |
//! | `GET`  | `/{kind}/archived`      | Archived copies                         |
//! | `GET`  | `/{kind}/create`        | Empty form; `?error_message=`           |
//! | `POST` | `/{kind}/create`        | 303 to the list, or back to the form    |
//! | `GET`  | `/{kind}/{id}/edit`     | Pre-filled form; 404 if missing         |
//! | `POST` | `/{kind}/{id}/edit`     | Replaces every field                    |
//! | `POST` | `/{kind}/{id}/delete`   | Archives, then 303 to the list          |

use std::{collections::HashMap, sync::Arc};

use axum::{
  Form, Router,
  extract::{Path, Query, State},
  response::{Html, Redirect},
  routing::{get, post},
};
use gamedex_api::AppState;
use gamedex_core::{
  console::Console,
  fields::RawFields,
  game::Game,
  record::{Page, Record, page_count},
  store::{ArchiveStore, RecordStore},
};
use serde::Deserialize;
use tracing::warn;

use crate::{
  error::{Error, Result},
  html,
};

/// A record type with catalog pages.
pub trait Listing: Record {
  const HEADING: &'static str;
  const PER_PAGE: u64;
}

impl Listing for Game {
  const HEADING: &'static str = "Games";
  const PER_PAGE: u64 = 20;
}

impl Listing for Console {
  const HEADING: &'static str = "Consoles";
  const PER_PAGE: u64 = 10;
}

fn base<R: Listing>() -> String { format!("/{}", R::KIND.plural()) }

fn noun<R: Listing>() -> String { R::KIND.label().to_lowercase() }

pub fn routes<S, R>() -> Router<Arc<AppState<S>>>
where
  S: RecordStore<R> + ArchiveStore<R> + 'static,
  R: Listing,
{
  let base = base::<R>();
  Router::new()
    .route(&base, get(list::<S, R>))
    .route(&format!("{base}/search"), get(search::<S, R>))
    .route(&format!("{base}/archived"), get(archived::<S, R>))
    .route(&format!("{base}/create"), get(create_form::<R>).post(create::<S, R>))
    .route(&format!("{base}/{{id}}/edit"), get(edit_form::<S, R>).post(edit::<S, R>))
    .route(&format!("{base}/{{id}}/delete"), post(delete::<S, R>))
}

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormParams {
  pub error_message: Option<String>,
}

// ─── Listings ────────────────────────────────────────────────────────────────

fn columns<R: Record>() -> Vec<&'static str> {
  std::iter::once("id").chain(R::FIELDS.iter().copied()).collect()
}

fn cells<R: Record>(id: i64, record: &R) -> Vec<String> {
  std::iter::once(id.to_string())
    .chain(record.to_fields().into_iter().map(Option::unwrap_or_default))
    .collect()
}

fn actions<R: Listing>(id: i64) -> String {
  let base = base::<R>();
  format!(
    "<td><a href=\"{base}/{id}/edit\">Edit</a> \
     <form method=\"post\" action=\"{base}/{id}/delete\" style=\"display:inline\">\
     <button type=\"submit\">Archive</button></form></td>"
  )
}

fn search_form<R: Listing>(q: &str) -> String {
  format!(
    "<form method=\"get\" action=\"{}/search\">\
     <input type=\"search\" name=\"q\" value=\"{}\"> <button type=\"submit\">Search</button></form>\n",
    base::<R>(),
    html::escape(q),
  )
}

/// `GET /{kind}?page=N`
pub async fn list<S, R>(
  State(state): State<Arc<AppState<S>>>,
  Query(params): Query<PageParams>,
) -> Result<Html<String>>
where
  S: RecordStore<R> + 'static,
  R: Listing,
{
  let total = state.catalog.count::<R>().await?;
  let pages = page_count(total, R::PER_PAGE);
  let page = params.page.unwrap_or(1).clamp(1, pages.max(1));
  let items = state.catalog.list::<R>(Page::numbered(page, R::PER_PAGE)).await?;

  let base = base::<R>();
  let mut body = format!(
    "<p><a href=\"{base}/create\">Add a {noun}</a> | <a href=\"{base}/archived\">Archived</a></p>\n",
    noun = noun::<R>(),
  );
  body.push_str(&search_form::<R>(""));
  body.push_str(&html::table(
    &columns::<R>(),
    items.iter().map(|s| (cells(s.id, &s.record), actions::<R>(s.id))),
  ));
  body.push_str(&html::pager(&base, page, pages));

  Ok(html::layout(R::HEADING, &body))
}

/// `GET /{kind}/search?q=`
pub async fn search<S, R>(
  State(state): State<Arc<AppState<S>>>,
  Query(params): Query<SearchParams>,
) -> Result<Html<String>>
where
  S: RecordStore<R> + 'static,
  R: Listing,
{
  let q = params.q.unwrap_or_default();
  let mut body = search_form::<R>(&q);

  if !q.trim().is_empty() {
    let hits = state.catalog.search::<R>(&q).await?;
    body.push_str(&format!("<p>{} result(s) for “{}”</p>\n", hits.len(), html::escape(q.trim())));
    body.push_str(&html::table(
      &columns::<R>(),
      hits.iter().map(|s| (cells(s.id, &s.record), actions::<R>(s.id))),
    ));
  }

  Ok(html::layout(&format!("Search {}", R::HEADING.to_lowercase()), &body))
}

/// `GET /{kind}/archived`
pub async fn archived<S, R>(State(state): State<Arc<AppState<S>>>) -> Result<Html<String>>
where
  S: ArchiveStore<R> + 'static,
  R: Listing,
{
  let archived = state.catalog.list_archived::<R>().await?;

  let mut header = columns::<R>();
  header.push("archived_at");
  let rows = archived.iter().map(|a| {
    let mut row = cells(a.id, &a.record);
    row.push(a.archived_at.to_rfc3339());
    (row, String::new())
  });

  Ok(html::layout(&format!("Archived {}", R::HEADING.to_lowercase()), &html::table(&header, rows)))
}

// ─── Forms ───────────────────────────────────────────────────────────────────

fn form_page<R: Listing>(title: &str, action: &str, values: &[Option<String>], error: Option<&str>) -> Html<String> {
  let body = format!(
    "{notice}<form method=\"post\" action=\"{action}\">\n{inputs}<button type=\"submit\">Save</button>\n</form>\n",
    notice = html::notice("error", error),
    inputs = html::inputs(R::FIELDS, values),
  );
  html::layout(title, &body)
}

fn parse_form<R: Record>(form: &HashMap<String, String>) -> Result<R> {
  let mut fields = RawFields::new();
  for (name, value) in form {
    fields.insert(name, value.as_str());
  }
  Ok(R::from_fields(&fields)?)
}

fn back_to(url: &str, err: &Error) -> Redirect {
  Redirect::to(&format!("{url}?error_message={}", html::query_value(&err.to_string())))
}

/// `GET /{kind}/create`
pub async fn create_form<R: Listing>(Query(params): Query<FormParams>) -> Html<String> {
  form_page::<R>(
    &format!("Add a {}", noun::<R>()),
    &format!("{}/create", base::<R>()),
    &[],
    params.error_message.as_deref(),
  )
}

/// `POST /{kind}/create`
pub async fn create<S, R>(
  State(state): State<Arc<AppState<S>>>,
  Form(form): Form<HashMap<String, String>>,
) -> Redirect
where
  S: RecordStore<R> + 'static,
  R: Listing,
{
  let created = match parse_form::<R>(&form) {
    Ok(record) => state.catalog.create(record).await.map_err(Error::from),
    Err(e) => Err(e),
  };

  match created {
    Ok(_) => Redirect::to(&base::<R>()),
    Err(err) => {
      warn!(kind = %R::KIND, "create form rejected: {err}");
      back_to(&format!("{}/create", base::<R>()), &err)
    }
  }
}

/// `GET /{kind}/{id}/edit`
pub async fn edit_form<S, R>(
  State(state): State<Arc<AppState<S>>>,
  Path(id): Path<i64>,
  Query(params): Query<FormParams>,
) -> Result<Html<String>>
where
  S: RecordStore<R> + 'static,
  R: Listing,
{
  let stored = state.catalog.get::<R>(id).await?;
  Ok(form_page::<R>(
    &format!("Edit {} #{id}", noun::<R>()),
    &format!("{}/{id}/edit", base::<R>()),
    &stored.record.to_fields(),
    params.error_message.as_deref(),
  ))
}

/// `POST /{kind}/{id}/edit`. The form carries every field, so the update
/// replaces the whole record.
pub async fn edit<S, R>(
  State(state): State<Arc<AppState<S>>>,
  Path(id): Path<i64>,
  Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect>
where
  S: RecordStore<R> + 'static,
  R: Listing,
{
  let updated = match parse_form::<R>(&form) {
    Ok(record) => state.catalog.update::<R>(id, record.into_patch()).await.map_err(Error::from),
    Err(e) => Err(e),
  };

  match updated {
    Ok(_) => Ok(Redirect::to(&base::<R>())),
    Err(err @ Error::NotFound(_)) => Err(err),
    Err(err) => {
      warn!(kind = %R::KIND, id, "edit form rejected: {err}");
      Ok(back_to(&format!("{}/{id}/edit", base::<R>()), &err))
    }
  }
}

/// `POST /{kind}/{id}/delete`
pub async fn delete<S, R>(
  State(state): State<Arc<AppState<S>>>,
  Path(id): Path<i64>,
) -> Result<Redirect>
where
  S: RecordStore<R> + ArchiveStore<R> + 'static,
  R: Listing,
{
  state.catalog.archive_and_remove::<R>(id).await?;
  Ok(Redirect::to(&base::<R>()))
}
