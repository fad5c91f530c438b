//! Importer tests against an in-memory SQLite store, plus a store double
//! whose batch inserts can be made to fail.

use std::{
  io::Write as _,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use gamedex_core::{
  console::Console,
  game::Game,
  record::{Page, RecordKind, Stored},
  store::{RecordStore, Storage, StorageError},
};
use gamedex_store_sqlite::SqliteStore;

use crate::Importer;

async fn importer() -> (Arc<SqliteStore>, Importer<SqliteStore>) {
  let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
  (Arc::clone(&store), Importer::new(store))
}

const GAMES_HEADER: &str =
  "Rank,Game Title,Platform,Year,Genre,Publisher,North America,Europe,Japan,Rest of World,Global,Review\n";

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn imports_rows_with_spreadsheet_headers() {
  let (store, imp) = importer().await;
  let csv = format!(
    "{GAMES_HEADER}\
     1,Wii Sports,Wii,2006.0,Sports,Nintendo,41.36,28.96,3.77,8.45,82.54,7.7\n\
     2,\"Super Mario Bros., Deluxe\",NES,1985,Platform,Nintendo,29.08,3.58,6.81,0.77,40.24,\n"
  );

  let summary = imp.import_str::<Game>(&csv).await;
  assert_eq!(summary.kind, RecordKind::Game);
  assert_eq!((summary.total, summary.imported, summary.failed), (2, 2, 0));
  assert!(summary.source_error.is_none());

  let stored = RecordStore::<Game>::list(&*store, Page::default()).await.unwrap();
  assert_eq!(stored[0].record.year, Some(2006));
  assert_eq!(stored[1].record.title, "Super Mario Bros., Deluxe");
  assert_eq!(stored[1].record.review, None);
}

#[tokio::test]
async fn header_variants_normalize_to_the_same_fields() {
  let (store, imp) = importer().await;
  let csv = "console-name, TYPE ,company,released year,Discontinuation__Year,units sold\n\
             PS2,Home,Sony,2000,2013,155\n";

  let summary = imp.import_str::<Console>(csv).await;
  assert_eq!(summary.imported, 1, "{:?}", summary.failures);

  let stored = RecordStore::<Console>::list(&*store, Page::default()).await.unwrap();
  assert_eq!(stored[0].record.name, "PS2");
  assert_eq!(stored[0].record.discontinuation_year, Some(2013));
}

// ─── Partial failure ─────────────────────────────────────────────────────────

#[tokio::test]
async fn clashing_header_columns_are_reported() {
  let (store, imp) = importer().await;
  let csv = "Console Name,Type,Company,Released Year,console_name
             Wii,Home,Nintendo,2006,Ignored
";

  let summary = imp.import_str::<Console>(csv).await;
  assert_eq!(summary.imported, 1);
  assert_eq!(summary.warnings.len(), 1);
  assert!(summary.warnings[0].contains("console_name"));

  let stored = RecordStore::<Console>::list(&*store, Page::default()).await.unwrap();
  assert_eq!(stored[0].record.name, "Wii");
}

#[tokio::test]
async fn invalid_rows_are_skipped_and_reported() {
  let (store, imp) = importer().await;
  let csv = "Console_Name,Type,Company,Released_Year,Discontinuation_Year,Units_Sold\n\
             PS2,Home,Sony,2000,2013,155\n\
             Broken,Home,Sony,not-a-year,,\n\
             Wii,Home,Nintendo,2006,2013,101.63\n\
             ,Home,Nobody,2001,,\n\
             Late,Home,Sega,2010,2001,\n\
             Switch,Hybrid,Nintendo,2017,,141.32\n";

  let summary = imp.import_str::<Console>(csv).await;
  assert_eq!((summary.total, summary.imported, summary.failed), (6, 3, 3));

  let lines: Vec<_> = summary.failures.iter().map(|f| f.line).collect();
  assert_eq!(lines, [3, 5, 6]);
  assert!(summary.failures[0].reason.contains("Released_Year"));
  assert!(summary.failures[1].reason.contains("Console_Name"));
  assert!(summary.failures[2].reason.contains("Discontinuation_Year"));

  let names: Vec<_> = RecordStore::<Console>::list(&*store, Page::default())
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.record.name)
    .collect();
  assert_eq!(names, ["PS2", "Wii", "Switch"]);
}

#[tokio::test]
async fn game_without_rank_is_skipped() {
  let (_, imp) = importer().await;
  let csv = format!("{GAMES_HEADER},Nameless,PC,2001,Action,Acme,,,,,1.0,\n");

  let summary = imp.import_str::<Game>(&csv).await;
  assert_eq!((summary.imported, summary.failed), (0, 1));
  assert!(summary.failures[0].reason.contains("Rank"));
}

#[tokio::test]
async fn malformed_csv_row_fails_alone() {
  let (_, imp) = importer().await;
  let csv = "Console_Name,Type,Company,Released_Year\n\
             \"PS2\"x,Home,Sony,2000\n\
             Wii,Home,Nintendo,2006\n";

  let summary = imp.import_str::<Console>(csv).await;
  assert_eq!((summary.total, summary.imported, summary.failed), (2, 1, 1));
  assert_eq!(summary.failures[0].line, 2);
}

// ─── Sources ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_source_is_fatal_but_not_raised() {
  let (_, imp) = importer().await;
  let summary = imp.import_path::<Game>("/definitely/not/here.csv").await;

  assert!(summary.is_fatal());
  assert_eq!((summary.total, summary.imported, summary.failed), (0, 0, 0));
  assert!(summary.source_error.unwrap().contains("here.csv"));
}

#[tokio::test]
async fn empty_source_has_no_header() {
  let (_, imp) = importer().await;
  let summary = imp.import_str::<Game>("").await;
  assert_eq!(summary.source_error.as_deref(), Some("source has no header row"));
}

#[tokio::test]
async fn imports_from_a_file() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  write!(
    file,
    "Console_Name,Type,Company,Released_Year,Discontinuation_Year,Units_Sold\r\n\
     Game Boy,Handheld,Nintendo,1989,2003,118.69\r\n"
  )
  .unwrap();

  let (_, imp) = importer().await;
  let summary = imp.import_path::<Console>(file.path()).await;
  assert_eq!(summary.imported, 1);
}

// ─── Batching ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("batch rejected")]
struct Rejected;

impl StorageError for Rejected {
  fn is_conflict(&self) -> bool { false }
}

/// Counts batch calls and fails the one numbered `fail_on` (1-based).
#[derive(Default)]
struct FlakyStore {
  rows:    Mutex<Vec<Stored<Console>>>,
  calls:   AtomicUsize,
  fail_on: usize,
}

impl Storage for FlakyStore {
  type Error = Rejected;
}

impl RecordStore<Console> for FlakyStore {
  async fn create(&self, record: Console) -> Result<Stored<Console>, Rejected> {
    let mut rows = self.rows.lock().unwrap();
    let stored = Stored { id: rows.len() as i64 + 1, record };
    rows.push(stored.clone());
    Ok(stored)
  }

  async fn insert_batch(&self, records: Vec<Console>) -> Result<Vec<Stored<Console>>, Rejected> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
    if call == self.fail_on {
      return Err(Rejected);
    }
    let mut out = Vec::new();
    for record in records {
      out.push(self.create(record).await?);
    }
    Ok(out)
  }

  async fn get(&self, id: i64) -> Result<Option<Stored<Console>>, Rejected> {
    Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
  }

  async fn list(&self, _page: Page) -> Result<Vec<Stored<Console>>, Rejected> {
    Ok(self.rows.lock().unwrap().clone())
  }

  async fn count(&self) -> Result<u64, Rejected> { Ok(self.rows.lock().unwrap().len() as u64) }

  async fn search(&self, _text: String) -> Result<Vec<Stored<Console>>, Rejected> { Ok(Vec::new()) }

  async fn update(
    &self,
    _id: i64,
    _patch: gamedex_core::console::ConsolePatch,
  ) -> Result<Option<Stored<Console>>, Rejected> {
    Ok(None)
  }

  async fn delete(&self, _id: i64) -> Result<Option<Stored<Console>>, Rejected> { Ok(None) }
}

fn consoles_csv(n: usize) -> String {
  let mut csv = String::from("Console_Name,Type,Company,Released_Year\n");
  for i in 0..n {
    csv.push_str(&format!("C{i},Home,Acme,2000\n"));
  }
  csv
}

#[tokio::test]
async fn flushes_in_batches_of_configured_size() {
  let store = Arc::new(FlakyStore::default());
  let imp = Importer::new(Arc::clone(&store)).with_batch_size(2);

  let summary = imp.import_str::<Console>(&consoles_csv(5)).await;
  assert_eq!(summary.imported, 5);
  assert_eq!(store.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_batch_does_not_stop_later_batches() {
  let store = Arc::new(FlakyStore { fail_on: 2, ..FlakyStore::default() });
  let imp = Importer::new(Arc::clone(&store)).with_batch_size(2);

  let summary = imp.import_str::<Console>(&consoles_csv(5)).await;
  assert_eq!((summary.total, summary.imported, summary.failed), (5, 3, 2));

  let lines: Vec<_> = summary.failures.iter().map(|f| f.line).collect();
  assert_eq!(lines, [4, 5]);
  assert!(summary.failures[0].reason.starts_with("batch insert failed"));
  assert_eq!(store.rows.lock().unwrap().len(), 3);
}

#[test]
fn batch_size_has_a_floor_of_one() {
  let imp = Importer::new(Arc::new(FlakyStore::default())).with_batch_size(0);
  assert_eq!(imp.batch_size(), 1);
}
