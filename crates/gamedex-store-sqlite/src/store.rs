//! [`SqliteStore`], the SQLite implementation of the Gamedex store traits.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};

use gamedex_core::{
  record::{Archived, Page, Stored},
  store::{ArchiveStore, RecordStore, Storage, SubscriberStore},
  subscriber::Subscriber,
};

use crate::{
  encode::{
    RawArchived, RawSubscriber, SqlRecord, assignments, columns, encode_dt, like_pattern,
    placeholders,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gamedex store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn select_sql<R: SqlRecord>(tail: &str) -> String {
  format!("SELECT id, {} FROM {} {tail}", columns::<R>(), R::TABLE)
}

fn insert_sql<R: SqlRecord>() -> String {
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    R::TABLE,
    columns::<R>(),
    placeholders(R::FIELDS.len()),
  )
}

fn read_stored<R: SqlRecord>(row: &rusqlite::Row<'_>) -> rusqlite::Result<Stored<R>> {
  Ok(Stored { id: row.get(0)?, record: R::read(row, 1)? })
}

fn sql_int(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

impl Storage for SqliteStore {
  type Error = Error;
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl<R: SqlRecord> RecordStore<R> for SqliteStore {
  async fn create(&self, record: R) -> Result<Stored<R>> {
    let sql    = insert_sql::<R>();
    let params = record.params();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(&sql, params_from_iter(params))?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Stored { id, record })
  }

  async fn insert_batch(&self, records: Vec<R>) -> Result<Vec<Stored<R>>> {
    let sql  = insert_sql::<R>();
    let rows: Vec<Vec<Value>> = records.iter().map(SqlRecord::params).collect();

    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(rows.len());
        {
          let mut stmt = tx.prepare(&sql)?;
          for params in rows {
            stmt.execute(params_from_iter(params))?;
            ids.push(tx.last_insert_rowid());
          }
        }
        tx.commit()?;
        Ok(ids)
      })
      .await?;

    Ok(
      ids
        .into_iter()
        .zip(records)
        .map(|(id, record)| Stored { id, record })
        .collect(),
    )
  }

  async fn get(&self, id: i64) -> Result<Option<Stored<R>>> {
    let sql = select_sql::<R>("WHERE id = ?1");

    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.query_row(&sql, [id], read_stored::<R>).optional()?))
        .await?,
    )
  }

  async fn list(&self, page: Page) -> Result<Vec<Stored<R>>> {
    let sql    = select_sql::<R>("ORDER BY id LIMIT ?1 OFFSET ?2");
    let limit  = sql_int(page.limit);
    let offset = sql_int(page.skip);

    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map([limit, offset], read_stored::<R>)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn count(&self) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);

    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn search(&self, text: String) -> Result<Vec<Stored<R>>> {
    let sql = select_sql::<R>(&format!(
      "WHERE \"{}\" LIKE ?1 ESCAPE '\\' ORDER BY id",
      R::SEARCH_COLUMN
    ));
    let pattern = like_pattern(&text);

    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map([pattern], read_stored::<R>)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn update(&self, id: i64, patch: R::Patch) -> Result<Option<Stored<R>>> {
    let select = select_sql::<R>("WHERE id = ?1");
    let update = format!(
      "UPDATE {} SET {} WHERE id = ?{}",
      R::TABLE,
      assignments::<R>(),
      R::FIELDS.len() + 1,
    );

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let current = tx.query_row(&select, [id], read_stored::<R>).optional()?;
          let Some(Stored { mut record, .. }) = current else {
            return Ok(None);
          };

          record.apply(&patch);
          let mut params = record.params();
          params.push(Value::Integer(id));
          tx.execute(&update, params_from_iter(params))?;
          tx.commit()?;

          Ok(Some(Stored { id, record }))
        })
        .await?,
    )
  }

  async fn delete(&self, id: i64) -> Result<Option<Stored<R>>> {
    let select = select_sql::<R>("WHERE id = ?1");
    let delete = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let current = tx.query_row(&select, [id], read_stored::<R>).optional()?;
          if current.is_some() {
            tx.execute(&delete, [id])?;
          }
          tx.commit()?;
          Ok(current)
        })
        .await?,
    )
  }
}

// ─── ArchiveStore impl ───────────────────────────────────────────────────────

impl<R: SqlRecord> ArchiveStore<R> for SqliteStore {
  async fn archive(&self, archived: Archived<R>) -> Result<Archived<R>> {
    let sql = format!(
      "INSERT INTO {} (id, {}, archived_at) VALUES ({})",
      R::ARCHIVE_TABLE,
      columns::<R>(),
      placeholders(R::FIELDS.len() + 2),
    );
    let mut params = vec![Value::Integer(archived.id)];
    params.extend(archived.record.params());
    params.push(Value::Text(encode_dt(archived.archived_at)));

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, params_from_iter(params))?;
        Ok(())
      })
      .await?;

    Ok(archived)
  }

  async fn list_archived(&self) -> Result<Vec<Archived<R>>> {
    let sql = format!(
      "SELECT id, {}, archived_at FROM {} ORDER BY archive_id",
      columns::<R>(),
      R::ARCHIVE_TABLE,
    );
    let stamp_col = R::FIELDS.len() + 1;

    let raws: Vec<RawArchived<R>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawArchived {
              id:          row.get(0)?,
              record:      R::read(row, 1)?,
              archived_at: row.get(stamp_col)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArchived::into_archived).collect()
  }
}

// ─── SubscriberStore impl ────────────────────────────────────────────────────

impl SubscriberStore for SqliteStore {
  async fn find_subscriber(&self, email: String) -> Result<Option<Subscriber>> {
    // `email` is declared COLLATE NOCASE, so `=` ignores ASCII case.
    let raw: Option<RawSubscriber> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, subscribed_at FROM subscribers WHERE email = ?1",
              [email],
              RawSubscriber::read,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscriber::into_subscriber).transpose()
  }

  async fn add_subscriber(&self, email: String, subscribed_at: DateTime<Utc>) -> Result<Subscriber> {
    let at_str    = encode_dt(subscribed_at);
    let email_col = email.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscribers (email, subscribed_at) VALUES (?1, ?2)",
          rusqlite::params![email_col, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Subscriber { id, email, subscribed_at })
  }

  async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
    let raws: Vec<RawSubscriber> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, email, subscribed_at FROM subscribers ORDER BY id")?;
        let rows = stmt
          .query_map([], RawSubscriber::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscriber::into_subscriber).collect()
  }
}
