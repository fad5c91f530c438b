//! API error type, its [`IntoResponse`] implementation, and the middleware
//! that stamps the request path onto error bodies.
//!
//! Every error body has the shape
//! `{"message": "Something is wrong", "detail": "...", "path": "/api/..."}`.

use axum::{
  Json,
  extract::{
    OriginalUri, Request,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  middleware::Next,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<gamedex_core::Error> for ApiError {
  fn from(err: gamedex_core::Error) -> Self {
    use gamedex_core::Error as E;
    match err {
      E::NotFound { .. } => ApiError::NotFound(err.to_string()),
      E::Validation(v) => ApiError::BadRequest(v.to_string()),
      E::Conflict(m) => ApiError::Conflict(m),
      E::Store(e) => ApiError::Internal(e.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

/// The JSON error body. Carried as a response extension until
/// [`attach_path`] fills in `path`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
  pub message: &'static str,
  pub detail:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path:    Option<String>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, detail) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
      ApiError::Internal(m) => {
        error!(detail = %m, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, m)
      }
    };

    let body = ErrorBody { message: "Something is wrong", detail, path: None };
    let mut response = (status, Json(&body)).into_response();
    response.extensions_mut().insert(body);
    response
  }
}

/// Middleware: rewrite [`ApiError`] responses to include the path that was
/// requested, as seen by the outermost router.
pub async fn attach_path(OriginalUri(uri): OriginalUri, req: Request, next: Next) -> Response {
  let mut response = next.run(req).await;
  match response.extensions_mut().remove::<ErrorBody>() {
    Some(body) => {
      let body = ErrorBody { path: Some(uri.to_string()), ..body };
      (response.status(), Json(body)).into_response()
    }
    None => response,
  }
}
