//! Storage traits.
//!
//! Backends (`gamedex-store-sqlite`, `gamedex-store-csv`) implement these for
//! every [`Record`] type. The lifecycle manager, the registry and the
//! importer are written once against them.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  console::Console,
  game::Game,
  record::{Archived, Page, Record, Stored},
  subscriber::Subscriber,
};

/// Classifies backend failures for the core error mapping.
pub trait StorageError: std::error::Error + Send + Sync + 'static {
  /// `true` when a uniqueness or id constraint rejected the write.
  fn is_conflict(&self) -> bool;
}

/// The shared error type of a backend.
pub trait Storage: Send + Sync {
  type Error: StorageError;
}

// ─── Active records ──────────────────────────────────────────────────────────

/// Durable storage for active records of type `R`.
///
/// Inputs are assumed valid. Listings are ordered by id ascending.
pub trait RecordStore<R: Record>: Storage {
  /// Persist a new record and return it with its assigned id.
  fn create(&self, record: R) -> impl Future<Output = Result<Stored<R>, Self::Error>> + Send + '_;

  /// Persist several records as one unit: either all land or none do.
  fn insert_batch(
    &self,
    records: Vec<R>,
  ) -> impl Future<Output = Result<Vec<Stored<R>>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(&self, id: i64) -> impl Future<Output = Result<Option<Stored<R>>, Self::Error>> + Send + '_;

  fn list(&self, page: Page) -> impl Future<Output = Result<Vec<Stored<R>>, Self::Error>> + Send + '_;

  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Records whose [`Record::search_text`] contains `text`, ignoring case.
  fn search(&self, text: String) -> impl Future<Output = Result<Vec<Stored<R>>, Self::Error>> + Send + '_;

  /// Apply `patch` to the record with `id`. Returns `None` if not found.
  fn update(
    &self,
    id: i64,
    patch: R::Patch,
  ) -> impl Future<Output = Result<Option<Stored<R>>, Self::Error>> + Send + '_;

  /// Remove the record with `id` and return it. Returns `None` if not found.
  fn delete(&self, id: i64) -> impl Future<Output = Result<Option<Stored<R>>, Self::Error>> + Send + '_;
}

// ─── Archive ─────────────────────────────────────────────────────────────────

/// Append-only storage for archived copies of `R`.
pub trait ArchiveStore<R: Record>: Storage {
  fn archive(
    &self,
    archived: Archived<R>,
  ) -> impl Future<Output = Result<Archived<R>, Self::Error>> + Send + '_;

  /// Every archived copy, oldest archive first.
  fn list_archived(&self) -> impl Future<Output = Result<Vec<Archived<R>>, Self::Error>> + Send + '_;
}

// ─── Subscribers ─────────────────────────────────────────────────────────────

pub trait SubscriberStore: Storage {
  /// Look up a subscriber by email, ignoring ASCII case.
  fn find_subscriber(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Subscriber>, Self::Error>> + Send + '_;

  /// Insert a subscriber. Fails with a conflict if the email is taken.
  fn add_subscriber(
    &self,
    email: String,
    subscribed_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Subscriber, Self::Error>> + Send + '_;

  fn list_subscribers(&self) -> impl Future<Output = Result<Vec<Subscriber>, Self::Error>> + Send + '_;
}

// ─── Backend ─────────────────────────────────────────────────────────────────

/// Everything the HTTP layers and the importer need from one store.
pub trait Backend:
  RecordStore<Game>
  + RecordStore<Console>
  + ArchiveStore<Game>
  + ArchiveStore<Console>
  + SubscriberStore
  + 'static
{
}

impl<T> Backend for T where
  T: RecordStore<Game>
    + RecordStore<Console>
    + ArchiveStore<Game>
    + ArchiveStore<Console>
    + SubscriberStore
    + 'static
{
}
