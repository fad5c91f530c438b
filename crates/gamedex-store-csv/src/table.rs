//! One CSV file with a fixed header.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use gamedex_core::fields::RawFields;
use tokio::{fs, io::AsyncWriteExt as _};
use tracing::debug;

use crate::{Error, Result};

pub(crate) struct Table {
  path:   PathBuf,
  header: Vec<String>,
}

/// A data row keyed by its (normalized) column names.
pub(crate) struct Line {
  pub number: usize,
  pub fields: RawFields,
}

impl Table {
  pub fn new(dir: &Path, file: &str, header: Vec<String>) -> Self {
    Self { path: dir.join(file), header }
  }

  pub fn file_name(&self) -> String {
    self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default()
  }

  fn io(&self, source: std::io::Error) -> Error { Error::Io { path: self.path.clone(), source } }

  pub fn corrupt(&self, line: usize, reason: impl ToString) -> Error {
    Error::Corrupt { file: self.file_name(), line, reason: reason.to_string() }
  }

  /// Every data row. A missing file reads as empty. Cells are matched to
  /// the header the file was written with, not the current one.
  pub async fn read(&self) -> Result<Vec<Line>> {
    let text = match fs::read_to_string(&self.path).await {
      Ok(text) => text,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(self.io(e)),
    };

    let csv_err = |source| Error::Csv { file: self.file_name(), source };
    let mut rows = gamedex_csv::rows(&text);
    let Some(header) = rows.next().transpose().map_err(csv_err)? else {
      return Ok(Vec::new());
    };

    rows
      .map(|row| {
        let row = row.map_err(csv_err)?;
        Ok(Line { number: row.line, fields: RawFields::verbatim_row(&header.cells, &row.cells) })
      })
      .collect()
  }

  /// Append rows, writing the header first if the file is new or empty.
  pub async fn append(&self, rows: &[Vec<String>]) -> Result<()> {
    let fresh = match fs::metadata(&self.path).await {
      Ok(meta) => meta.len() == 0,
      Err(e) if e.kind() == ErrorKind::NotFound => true,
      Err(e) => return Err(self.io(e)),
    };

    let mut out = String::new();
    if fresh {
      gamedex_csv::write_row(&mut out, &self.header);
    }
    for row in rows {
      gamedex_csv::write_row(&mut out, row);
    }

    let mut file = fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .await
      .map_err(|e| self.io(e))?;
    file.write_all(out.as_bytes()).await.map_err(|e| self.io(e))?;
    file.flush().await.map_err(|e| self.io(e))
  }

  /// Replace the file contents with `rows`. Readers see either the old
  /// file or the new one.
  pub async fn rewrite(&self, rows: &[Vec<String>]) -> Result<()> {
    let mut out = String::new();
    gamedex_csv::write_row(&mut out, &self.header);
    for row in rows {
      gamedex_csv::write_row(&mut out, row);
    }

    let tmp = self.path.with_extension("csv.tmp");
    fs::write(&tmp, out.as_bytes()).await.map_err(|e| self.io(e))?;
    fs::rename(&tmp, &self.path).await.map_err(|e| self.io(e))?;
    debug!(file = %self.file_name(), rows = rows.len(), "table rewritten");
    Ok(())
  }
}
