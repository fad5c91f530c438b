//! [`CsvStore`], the flat-file implementation of the Gamedex store traits.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use gamedex_core::{
  record::{Archived, Page, Record, Stored},
  store::{ArchiveStore, RecordStore, Storage, SubscriberStore},
  subscriber::Subscriber,
};

use crate::{
  Error, Result,
  table::{Line, Table},
};

const ID: &str = "id";
const ARCHIVED_AT: &str = "archived_at";
const SUBSCRIBER_COLUMNS: [&str; 3] = ["id", "email", "subscribed_at"];

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gamedex store kept as CSV files in one directory.
///
/// Cloning is cheap; clones share the same lock.
#[derive(Clone)]
pub struct CsvStore {
  dir:  PathBuf,
  lock: Arc<Mutex<()>>,
}

impl CsvStore {
  /// Open a store rooted at `dir`, creating the directory if needed.
  /// Files are created on first write.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_owned();
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|source| Error::Io { path: dir.clone(), source })?;
    Ok(Self { dir, lock: Arc::new(Mutex::new(())) })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  fn active_table<R: Record>(&self) -> Table {
    Table::new(&self.dir, &format!("{}.csv", R::KIND.plural()), header::<R>(&[]))
  }

  fn archive_table<R: Record>(&self) -> Table {
    Table::new(
      &self.dir,
      &format!("deleted_{}.csv", R::KIND.plural()),
      header::<R>(&[ARCHIVED_AT]),
    )
  }

  fn subscriber_table(&self) -> Table {
    Table::new(
      &self.dir,
      "subscribers.csv",
      SUBSCRIBER_COLUMNS.iter().map(|c| c.to_string()).collect(),
    )
  }

  async fn read_active<R: Record>(&self) -> Result<Vec<Stored<R>>> {
    let table = self.active_table::<R>();
    table
      .read()
      .await?
      .iter()
      .map(|line| decode_stored(&table, line))
      .collect()
  }

  async fn read_archive<R: Record>(&self) -> Result<Vec<Archived<R>>> {
    let table = self.archive_table::<R>();
    table
      .read()
      .await?
      .iter()
      .map(|line| {
        let stored = decode_stored::<R>(&table, line)?;
        let stamp = line
          .fields
          .text(ARCHIVED_AT)
          .map_err(|e| table.corrupt(line.number, e))?;
        let archived_at = decode_dt(&stamp).map_err(|e| table.corrupt(line.number, e))?;
        Ok(Archived::new(stored, archived_at))
      })
      .collect()
  }

  async fn read_subscribers(&self) -> Result<Vec<Subscriber>> {
    let table = self.subscriber_table();
    table
      .read()
      .await?
      .iter()
      .map(|line| {
        let corrupt = |e: String| table.corrupt(line.number, e);
        let id = line.fields.int(ID).map_err(|e| corrupt(e.to_string()))?;
        let email = line.fields.text("email").map_err(|e| corrupt(e.to_string()))?;
        let stamp = line
          .fields
          .text("subscribed_at")
          .map_err(|e| corrupt(e.to_string()))?;
        let subscribed_at = decode_dt(&stamp).map_err(|e| corrupt(e.to_string()))?;
        Ok(Subscriber { id, email, subscribed_at })
      })
      .collect()
  }

  /// One past the largest id seen in the active file or the archive, so
  /// archived ids are never handed out again.
  async fn next_id<R: Record>(&self) -> Result<i64> {
    let active = self.read_active::<R>().await?.iter().map(|s| s.id).max();
    let archived = self.read_archive::<R>().await?.iter().map(|a| a.id).max();
    Ok(active.max(archived).unwrap_or(0) + 1)
  }
}

// ─── Encoding ────────────────────────────────────────────────────────────────

fn header<R: Record>(extra: &[&str]) -> Vec<String> {
  std::iter::once(ID)
    .chain(R::FIELDS.iter().copied())
    .chain(extra.iter().copied())
    .map(str::to_owned)
    .collect()
}

fn encode<R: Record>(id: i64, record: &R) -> Vec<String> {
  std::iter::once(id.to_string())
    .chain(record.to_fields().into_iter().map(Option::unwrap_or_default))
    .collect()
}

fn decode_stored<R: Record>(table: &Table, line: &Line) -> Result<Stored<R>> {
  let corrupt = |e: gamedex_core::fields::FieldError| table.corrupt(line.number, e);
  let id = line.fields.int(ID).map_err(corrupt)?;
  let record = R::from_fields(&line.fields).map_err(corrupt)?;
  Ok(Stored { id, record })
}

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn window<T>(items: Vec<T>, page: Page) -> Vec<T> {
  let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
  let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
  items.into_iter().skip(skip).take(limit).collect()
}

impl Storage for CsvStore {
  type Error = Error;
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl<R: Record> RecordStore<R> for CsvStore {
  async fn create(&self, record: R) -> Result<Stored<R>> {
    let _guard = self.lock.lock().await;
    let id = self.next_id::<R>().await?;
    self.active_table::<R>().append(&[encode(id, &record)]).await?;
    Ok(Stored { id, record })
  }

  async fn insert_batch(&self, records: Vec<R>) -> Result<Vec<Stored<R>>> {
    let _guard = self.lock.lock().await;
    let first = self.next_id::<R>().await?;
    let stored: Vec<Stored<R>> = records
      .into_iter()
      .zip(first..)
      .map(|(record, id)| Stored { id, record })
      .collect();

    let rows: Vec<_> = stored.iter().map(|s| encode(s.id, &s.record)).collect();
    self.active_table::<R>().append(&rows).await?;
    Ok(stored)
  }

  async fn get(&self, id: i64) -> Result<Option<Stored<R>>> {
    let _guard = self.lock.lock().await;
    Ok(self.read_active::<R>().await?.into_iter().find(|s| s.id == id))
  }

  async fn list(&self, page: Page) -> Result<Vec<Stored<R>>> {
    let _guard = self.lock.lock().await;
    let mut all = self.read_active::<R>().await?;
    all.sort_by_key(|s| s.id);
    Ok(window(all, page))
  }

  async fn count(&self) -> Result<u64> {
    let _guard = self.lock.lock().await;
    Ok(self.read_active::<R>().await?.len() as u64)
  }

  async fn search(&self, text: String) -> Result<Vec<Stored<R>>> {
    let needle = text.to_lowercase();
    let _guard = self.lock.lock().await;
    let mut hits: Vec<_> = self
      .read_active::<R>()
      .await?
      .into_iter()
      .filter(|s| s.record.search_text().to_lowercase().contains(&needle))
      .collect();
    hits.sort_by_key(|s| s.id);
    Ok(hits)
  }

  async fn update(&self, id: i64, patch: R::Patch) -> Result<Option<Stored<R>>> {
    let _guard = self.lock.lock().await;
    let mut all = self.read_active::<R>().await?;
    let Some(target) = all.iter_mut().find(|s| s.id == id) else {
      return Ok(None);
    };
    target.record.apply(&patch);
    let updated = target.clone();

    let rows: Vec<_> = all.iter().map(|s| encode(s.id, &s.record)).collect();
    self.active_table::<R>().rewrite(&rows).await?;
    Ok(Some(updated))
  }

  async fn delete(&self, id: i64) -> Result<Option<Stored<R>>> {
    let _guard = self.lock.lock().await;
    let mut all = self.read_active::<R>().await?;
    let Some(pos) = all.iter().position(|s| s.id == id) else {
      return Ok(None);
    };
    let removed = all.remove(pos);

    let rows: Vec<_> = all.iter().map(|s| encode(s.id, &s.record)).collect();
    self.active_table::<R>().rewrite(&rows).await?;
    Ok(Some(removed))
  }
}

// ─── ArchiveStore impl ───────────────────────────────────────────────────────

impl<R: Record> ArchiveStore<R> for CsvStore {
  async fn archive(&self, archived: Archived<R>) -> Result<Archived<R>> {
    let _guard = self.lock.lock().await;
    let mut row = encode(archived.id, &archived.record);
    row.push(encode_dt(archived.archived_at));
    self.archive_table::<R>().append(&[row]).await?;
    Ok(archived)
  }

  async fn list_archived(&self) -> Result<Vec<Archived<R>>> {
    let _guard = self.lock.lock().await;
    self.read_archive::<R>().await
  }
}

// ─── SubscriberStore impl ────────────────────────────────────────────────────

impl SubscriberStore for CsvStore {
  async fn find_subscriber(&self, email: String) -> Result<Option<Subscriber>> {
    let _guard = self.lock.lock().await;
    Ok(
      self
        .read_subscribers()
        .await?
        .into_iter()
        .find(|s| s.email.eq_ignore_ascii_case(&email)),
    )
  }

  async fn add_subscriber(&self, email: String, subscribed_at: DateTime<Utc>) -> Result<Subscriber> {
    let _guard = self.lock.lock().await;
    let existing = self.read_subscribers().await?;
    if existing.iter().any(|s| s.email.eq_ignore_ascii_case(&email)) {
      return Err(Error::Duplicate(email));
    }

    let id = existing.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    let row = vec![id.to_string(), email.clone(), encode_dt(subscribed_at)];
    self.subscriber_table().append(&[row]).await?;
    Ok(Subscriber { id, email, subscribed_at })
  }

  async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
    let _guard = self.lock.lock().await;
    let mut all = self.read_subscribers().await?;
    all.sort_by_key(|s| s.id);
    Ok(all)
  }
}
