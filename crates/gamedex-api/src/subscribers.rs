//! Handlers for the mailing list.
//!
//! | Method | Path           | Notes                                   |
//! |--------|----------------|-----------------------------------------|
//! | `POST` | `/subscribe`   | Body: `{"email":"…"}`; 201, 400 or 409 |
//! | `GET`  | `/subscribers` | Every subscriber, by id                 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use gamedex_core::{store::SubscriberStore, subscriber::Subscriber};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
  pub email: String,
}

/// `POST /subscribe`
pub async fn subscribe<S>(
  State(state): State<Arc<AppState<S>>>,
  body: Result<Json<SubscribeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriberStore + 'static,
{
  let Json(body) = body?;
  let subscriber = state.subscribers.subscribe(&body.email).await?;
  Ok((StatusCode::CREATED, Json(subscriber)))
}

/// `GET /subscribers`
pub async fn list<S>(State(state): State<Arc<AppState<S>>>) -> Result<Json<Vec<Subscriber>>, ApiError>
where
  S: SubscriberStore + 'static,
{
  Ok(Json(state.subscribers.list().await?))
}
