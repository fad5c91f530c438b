//! Server-rendered pages for Gamedex and the `server` binary's wiring.
//!
//! [`router`] serves the HTML pages at the root and nests the JSON API from
//! `gamedex-api` under `/api`, all over one shared [`AppState`].

pub mod catalog;
pub mod error;
pub mod html;
pub mod pages;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use gamedex_api::AppState;
use gamedex_core::{console::Console, game::Game, store::Backend};
use gamedex_import::DEFAULT_BATCH_SIZE;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which store backs the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
  /// A single SQLite database file at `store_path`.
  #[default]
  Sqlite,
  /// A directory of CSV files at `store_path`.
  Csv,
}

/// Runtime server configuration, deserialised from `gamedex.toml` and
/// `GAMEDEX_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub backend:           BackendKind,
  pub store_path:        PathBuf,
  pub import_batch_size: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_owned(),
      port:              8000,
      backend:           BackendKind::Sqlite,
      store_path:        PathBuf::from("gamedex.db"),
      import_batch_size: DEFAULT_BATCH_SIZE,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: HTML pages plus `/api`.
pub fn router<S: Backend>(state: Arc<AppState<S>>) -> Router {
  let pages = Router::new()
    .route("/", get(pages::home::<S>))
    .route("/about", get(pages::about))
    .route("/about_me", get(pages::about_me))
    .route("/subscribe", post(pages::subscribe::<S>))
    .route("/subscribers", get(pages::subscribers::<S>))
    .merge(catalog::routes::<S, Game>())
    .merge(catalog::routes::<S, Console>())
    .with_state(Arc::clone(&state));

  pages
    .nest("/api", gamedex_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
