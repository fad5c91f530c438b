//! Error types and axum `IntoResponse` implementation for the HTML pages.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use gamedex_core::fields::FieldError;
use thiserror::Error;
use tracing::error;

use crate::html;

/// A failed page request, rendered as an HTML error page.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  NotFound(String),
  #[error("{0}")]
  BadRequest(String),
  #[error("{0}")]
  Conflict(String),
  #[error("store error: {0}")]
  Store(String),
}

impl From<gamedex_core::Error> for Error {
  fn from(err: gamedex_core::Error) -> Self {
    use gamedex_core::Error as E;
    match err {
      E::NotFound { .. } => Error::NotFound(err.to_string()),
      E::Validation(v) => Error::BadRequest(v.to_string()),
      E::Conflict(m) => Error::Conflict(m),
      E::Store(e) => Error::Store(e.to_string()),
    }
  }
}

impl From<FieldError> for Error {
  fn from(err: FieldError) -> Self { Error::BadRequest(err.to_string()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::Store(m) => {
        error!(detail = %m, "page request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!("<p>{}</p>\n", html::escape(&self.to_string()));
    (status, html::layout(title, &body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
