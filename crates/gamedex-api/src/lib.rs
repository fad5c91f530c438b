//! JSON REST API for Gamedex.
//!
//! Exposes an axum [`Router`] backed by any [`Backend`]. The router is
//! state-free once built, so it can be nested anywhere.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gamedex_api::api_router(state.clone()))
//! ```

pub mod error;
pub mod import;
pub mod records;
pub mod subscribers;

use std::sync::Arc;

use axum::{
  Router, middleware,
  routing::{get, post},
};
use gamedex_core::{
  clock::Clock,
  console::Console,
  game::Game,
  lifecycle::Lifecycle,
  store::Backend,
  subscriber::Registry,
};
use gamedex_import::Importer;

pub use error::ApiError;

/// Shared state for the API and the web pages.
pub struct AppState<S> {
  pub catalog:     Lifecycle<S>,
  pub subscribers: Registry<S>,
  pub importer:    Importer<S>,
}

impl<S: Backend> AppState<S> {
  /// Wire every component to the same store and clock.
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, import_batch_size: usize) -> Self {
    Self {
      catalog:     Lifecycle::new(Arc::clone(&store), Arc::clone(&clock)),
      subscribers: Registry::new(Arc::clone(&store), clock),
      importer:    Importer::new(store).with_batch_size(import_batch_size),
    }
  }
}

/// Build the API router for `state`.
pub fn api_router<S: Backend>(state: Arc<AppState<S>>) -> Router<()> {
  Router::new()
    // Games
    .route("/games", get(records::list::<S, Game>).post(records::create::<S, Game>))
    .route("/games/search", get(records::search::<S, Game>))
    .route("/games/archived", get(records::archived::<S, Game>))
    .route(
      "/games/{id}",
      get(records::get_one::<S, Game>)
        .put(records::replace::<S, Game>)
        .patch(records::update::<S, Game>),
    )
    .route("/games/{id}/archive", post(records::archive::<S, Game>))
    // Consoles
    .route("/consoles", get(records::list::<S, Console>).post(records::create::<S, Console>))
    .route("/consoles/search", get(records::search::<S, Console>))
    .route("/consoles/archived", get(records::archived::<S, Console>))
    .route(
      "/consoles/{id}",
      get(records::get_one::<S, Console>)
        .put(records::replace::<S, Console>)
        .patch(records::update::<S, Console>),
    )
    .route("/consoles/{id}/archive", post(records::archive::<S, Console>))
    // Mailing list
    .route("/subscribe", post(subscribers::subscribe::<S>))
    .route("/subscribers", get(subscribers::list::<S>))
    // Bulk import
    .route("/import", post(import::handler::<S>))
    .layer(middleware::from_fn(error::attach_path))
    .with_state(state)
}

#[cfg(test)]
mod tests;
