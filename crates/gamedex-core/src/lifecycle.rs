//! The lifecycle manager: create, read, update and archive records.
//!
//! [`Lifecycle`] is the only component that moves a record from the active
//! store to the archive. The move is ordered: the archived copy is written
//! before the active row is deleted, so an interruption between the two
//! steps can leave a record in both places but never in neither.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
  Error, Result,
  clock::Clock,
  filter::Filter,
  record::{Archived, Page, Record, Stored},
  store::{ArchiveStore, RecordStore},
};

/// Orchestrates record operations over a backend `S`.
pub struct Lifecycle<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
}

impl<S> Clone for Lifecycle<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store), clock: Arc::clone(&self.clock) } }
}

fn not_found<R: Record>(id: i64) -> Error { Error::NotFound { kind: R::KIND, id } }

impl<S> Lifecycle<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self { Self { store, clock } }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn get<R: Record>(&self, id: i64) -> Result<Stored<R>>
  where
    S: RecordStore<R>,
  {
    RecordStore::<R>::get(&*self.store, id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| not_found::<R>(id))
  }

  pub async fn list<R: Record>(&self, page: Page) -> Result<Vec<Stored<R>>>
  where
    S: RecordStore<R>,
  {
    RecordStore::<R>::list(&*self.store, page).await.map_err(Error::from_store)
  }

  /// Like [`list`](Self::list), keeping only records `filter` matches. The
  /// page applies to the filtered rows.
  pub async fn list_filtered<R: Record>(&self, filter: &Filter, page: Page) -> Result<Vec<Stored<R>>>
  where
    S: RecordStore<R>,
  {
    if filter.is_empty() {
      return self.list::<R>(page).await;
    }
    let all = self.list::<R>(Page { skip: 0, limit: u64::MAX }).await?;
    Ok(
      all
        .into_iter()
        .filter(|s| filter.matches(&s.record))
        .skip(usize::try_from(page.skip).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect(),
    )
  }

  pub async fn count<R: Record>(&self) -> Result<u64>
  where
    S: RecordStore<R>,
  {
    RecordStore::<R>::count(&*self.store).await.map_err(Error::from_store)
  }

  pub async fn search<R: Record>(&self, text: &str) -> Result<Vec<Stored<R>>>
  where
    S: RecordStore<R>,
  {
    RecordStore::<R>::search(&*self.store, text.trim().to_owned())
      .await
      .map_err(Error::from_store)
  }

  pub async fn list_archived<R: Record>(&self) -> Result<Vec<Archived<R>>>
  where
    S: ArchiveStore<R>,
  {
    ArchiveStore::<R>::list_archived(&*self.store).await.map_err(Error::from_store)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Validate and persist a new record.
  pub async fn create<R: Record>(&self, record: R) -> Result<Stored<R>>
  where
    S: RecordStore<R>,
  {
    record.validate()?;
    let stored = RecordStore::<R>::create(&*self.store, record)
      .await
      .map_err(Error::from_store)?;
    info!(kind = %R::KIND, id = stored.id, "record created");
    Ok(stored)
  }

  /// Apply a partial update. The patched record is validated as a whole
  /// before anything is written.
  pub async fn update<R: Record>(&self, id: i64, patch: R::Patch) -> Result<Stored<R>>
  where
    S: RecordStore<R>,
  {
    let mut next = self.get::<R>(id).await?.record;
    next.apply(&patch);
    next.validate()?;

    let updated = RecordStore::<R>::update(&*self.store, id, patch)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| not_found::<R>(id))?;
    info!(kind = %R::KIND, id, "record updated");
    Ok(updated)
  }

  /// Parse a JSON patch body against the record's allow-list, then
  /// [`update`](Self::update).
  pub async fn update_json<R: Record>(&self, id: i64, body: &Map<String, Value>) -> Result<Stored<R>>
  where
    S: RecordStore<R>,
  {
    let patch = R::parse_patch(body)?;
    self.update::<R>(id, patch).await
  }

  /// Move a record to the archive.
  ///
  /// Fetch, write the archived copy, then delete the active row, in that
  /// order. Calling this twice for the same id fails with
  /// [`Error::NotFound`] the second time.
  pub async fn archive_and_remove<R: Record>(&self, id: i64) -> Result<Archived<R>>
  where
    S: RecordStore<R> + ArchiveStore<R>,
  {
    let stored = self.get::<R>(id).await?;
    let archived = Archived::new(stored, self.clock.now());

    let archived = ArchiveStore::<R>::archive(&*self.store, archived)
      .await
      .map_err(Error::from_store)?;

    let removed = RecordStore::<R>::delete(&*self.store, id)
      .await
      .map_err(Error::from_store)?;
    if removed.is_none() {
      warn!(kind = %R::KIND, id, "record vanished after archiving; archived copy kept");
      return Err(not_found::<R>(id));
    }

    info!(kind = %R::KIND, id, archived_at = %archived.archived_at, "record archived");
    Ok(archived)
  }
}
