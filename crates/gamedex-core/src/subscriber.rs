//! The mailing-list registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Error, Result,
  clock::Clock,
  store::SubscriberStore,
  validate,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
  pub id:            i64,
  pub email:         String,
  pub subscribed_at: DateTime<Utc>,
}

/// Registers subscribers. Emails are unique ignoring ASCII case.
pub struct Registry<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
}

impl<S> Clone for Registry<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store), clock: Arc::clone(&self.clock) } }
}

impl<S: SubscriberStore> Registry<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self { Self { store, clock } }

  /// Subscribe `email`.
  ///
  /// Fails with [`Error::Validation`] for a malformed address and
  /// [`Error::Conflict`] if it is already registered.
  pub async fn subscribe(&self, email: &str) -> Result<Subscriber> {
    let email = email.trim();
    validate::email(email)?;

    let existing = self
      .store
      .find_subscriber(email.to_owned())
      .await
      .map_err(Error::from_store)?;
    if existing.is_some() {
      return Err(Error::Conflict(format!("{email} is already subscribed")));
    }

    let subscriber = self
      .store
      .add_subscriber(email.to_owned(), self.clock.now())
      .await
      .map_err(Error::from_store)?;
    info!(id = subscriber.id, "subscriber added");
    Ok(subscriber)
  }

  pub async fn list(&self) -> Result<Vec<Subscriber>> {
    self.store.list_subscribers().await.map_err(Error::from_store)
  }
}
