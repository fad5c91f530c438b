//! [`Importer`]: batched, failure-tolerant CSV import.

use std::{path::Path, sync::Arc};

use gamedex_core::{
  fields::{RawFields, duplicate_columns},
  record::Record,
  store::RecordStore,
};
use tracing::{error, info, warn};

use crate::{Error, ImportSummary, Result};

/// Rows committed per `insert_batch` call unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Imports CSV rows into a store `S`.
pub struct Importer<S> {
  store:      Arc<S>,
  batch_size: usize,
}

impl<S> Clone for Importer<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store), batch_size: self.batch_size } }
}

/// Valid rows waiting for the next flush, with the line each came from.
struct Batch<R> {
  lines:   Vec<usize>,
  records: Vec<R>,
}

impl<R> Batch<R> {
  fn new() -> Self { Self { lines: Vec::new(), records: Vec::new() } }

  fn len(&self) -> usize { self.records.len() }

  fn is_empty(&self) -> bool { self.records.is_empty() }

  fn push(&mut self, line: usize, record: R) {
    self.lines.push(line);
    self.records.push(record);
  }
}

impl<S> Importer<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, batch_size: DEFAULT_BATCH_SIZE } }

  /// Set the flush threshold. Values below 1 are treated as 1.
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }

  pub fn batch_size(&self) -> usize { self.batch_size }

  /// Import every row of the CSV file at `path`.
  ///
  /// A file that cannot be read, or is not UTF-8, produces a summary with
  /// [`source_error`](ImportSummary::source_error) set and nothing imported.
  pub async fn import_path<R: Record>(&self, path: impl AsRef<Path>) -> ImportSummary
  where
    S: RecordStore<R>,
  {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
      Ok(text) => {
        info!(kind = %R::KIND, path = %path.display(), "importing");
        self.import_str::<R>(&text).await
      }
      Err(source) => {
        let err = Error::Source { path: path.to_owned(), source };
        error!(kind = %R::KIND, "{err}");
        ImportSummary::source_failed(R::KIND, &err)
      }
    }
  }

  /// Import every row of an in-memory CSV document.
  pub async fn import_str<R: Record>(&self, input: &str) -> ImportSummary
  where
    S: RecordStore<R>,
  {
    let mut rows = gamedex_csv::rows(input);
    let header = match rows.next() {
      Some(Ok(row)) => row.cells,
      Some(Err(e)) => return ImportSummary::source_failed(R::KIND, &Error::Csv(e)),
      None => return ImportSummary::source_failed(R::KIND, &Error::NoHeader),
    };

    let mut summary = ImportSummary::new(R::KIND);
    for column in duplicate_columns(&header) {
      warn!(kind = %R::KIND, column = %column, "column repeats an earlier one and is ignored");
      summary
        .warnings
        .push(format!("column {column:?} repeats an earlier column and was ignored"));
    }
    let mut batch = Batch::new();

    for row in rows {
      summary.total += 1;
      let (line, parsed) = match row {
        Ok(row) => (row.line, parse_row::<R>(&header, &row.cells)),
        Err(e) => (e.line(), Err(Error::Csv(e))),
      };

      match parsed {
        Ok(record) => {
          batch.push(line, record);
          if batch.len() >= self.batch_size {
            let full = std::mem::replace(&mut batch, Batch::new());
            self.flush(full, &mut summary).await;
          }
        }
        Err(err) => {
          warn!(kind = %R::KIND, line, "skipping row: {err}");
          summary.fail(line, &err);
        }
      }
    }

    if !batch.is_empty() {
      self.flush(batch, &mut summary).await;
    }

    info!(
      kind = %R::KIND,
      total = summary.total,
      imported = summary.imported,
      failed = summary.failed,
      "import finished"
    );
    summary
  }

  async fn flush<R: Record>(&self, batch: Batch<R>, summary: &mut ImportSummary)
  where
    S: RecordStore<R>,
  {
    let Batch { lines, records } = batch;
    let size = records.len();

    match RecordStore::<R>::insert_batch(&*self.store, records).await {
      Ok(stored) => {
        summary.imported += stored.len();
        info!(kind = %R::KIND, rows = size, "batch committed");
      }
      Err(e) => {
        let err = Error::Flush(e.to_string());
        error!(kind = %R::KIND, rows = size, "{err}");
        for line in lines {
          summary.fail(line, &err);
        }
      }
    }
  }
}

/// Coerce and validate one data row.
fn parse_row<R: Record>(header: &[String], cells: &[String]) -> Result<R> {
  let fields = RawFields::from_row(header, cells);
  let record = R::from_fields(&fields)?;
  record.validate()?;
  Ok(record)
}
