//! Router tests over an in-memory SQLite store.

use std::{io::Write as _, sync::Arc};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use gamedex_core::clock::FixedClock;
use gamedex_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, api_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
  let state = AppState::new(Arc::new(store), Arc::new(clock), 500);
  Router::new().nest("/api", api_router(Arc::new(state)))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, json)
}

fn foo() -> Value {
  json!({
    "Rank": 1, "Game_Title": "Foo", "Platform": "PC", "Year": 2010,
    "Genre": "Action", "Publisher": "Acme", "North_America": 1.0,
    "Europe": 0.5, "Japan": 0.1, "Rest_of_World": 0.2, "Global": 1.8,
    "Review": "8.5"
  })
}

fn ps2() -> Value {
  json!({
    "Console_Name": "PlayStation 2", "Type": "Home", "Company": "Sony",
    "Released_Year": 2000, "Discontinuation_Year": 2013, "Units_Sold": 155.0
  })
}

// ─── Games ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_get_and_archive_game() {
  let app = app().await;

  let (status, created) = call(&app, "POST", "/api/games", Some(foo())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["id"], 1);
  assert_eq!(created["Game_Title"], "Foo");

  let (status, fetched) = call(&app, "GET", "/api/games/1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);

  let (status, archived) = call(&app, "POST", "/api/games/1/archive", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(archived["Rank"], 1);
  assert_eq!(archived["archived_at"], "2024-03-01T12:00:00Z");

  let (status, err) = call(&app, "GET", "/api/games/1", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["message"], "Something is wrong");
  assert_eq!(err["detail"], "Game not found");
  assert_eq!(err["path"], "/api/games/1");

  let (_, listed) = call(&app, "GET", "/api/games/archived", None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);

  let (status, _) = call(&app, "POST", "/api/games/1/archive", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_game_is_rejected_with_400() {
  let app = app().await;

  let mut negative = foo();
  negative["Global"] = json!(-1.0);
  let (status, err) = call(&app, "POST", "/api/games", Some(negative)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(err["detail"].as_str().unwrap().contains("Global"));

  let mut missing = foo();
  missing.as_object_mut().unwrap().remove("Platform");
  let (status, _) = call(&app, "POST", "/api/games", Some(missing)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, listed) = call(&app, "GET", "/api/games", None).await;
  assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
  let app = app().await;
  call(&app, "POST", "/api/games", Some(foo())).await;

  let (status, updated) =
    call(&app, "PATCH", "/api/games/1", Some(json!({ "Review": null, "Global": 2.0 }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["Review"], Value::Null);
  assert_eq!(updated["Global"], 2.0);
  assert_eq!(updated["Platform"], "PC");

  let (status, _) = call(&app, "PATCH", "/api/games/1", Some(json!({ "id": 7 }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, err) = call(&app, "PATCH", "/api/games/9", Some(json!({ "Global": 2.0 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["detail"], "Game not found");
}

#[tokio::test]
async fn list_pages_and_search() {
  let app = app().await;
  for title in ["Mario Kart", "Tetris", "Super Mario 64"] {
    let mut g = foo();
    g["Game_Title"] = json!(title);
    call(&app, "POST", "/api/games", Some(g)).await;
  }

  let (_, page) = call(&app, "GET", "/api/games?skip=1&limit=1", None).await;
  assert_eq!(page[0]["Game_Title"], "Tetris");

  let (_, hits) = call(&app, "GET", "/api/games/search?q=mario", None).await;
  assert_eq!(hits.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_filters_match_whole_values_ignoring_case() {
  let app = app().await;
  for (title, genre, platform) in
    [("Mario Kart", "Racing", "Wii"), ("Tetris", "Puzzle", "GB"), ("Wii Sports", "Sports", "Wii")]
  {
    let mut g = foo();
    g["Game_Title"] = json!(title);
    g["Genre"] = json!(genre);
    g["Platform"] = json!(platform);
    call(&app, "POST", "/api/games", Some(g)).await;
  }

  let (status, wii) = call(&app, "GET", "/api/games?platform=WII", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(wii.as_array().unwrap().len(), 2);

  let (_, one) = call(&app, "GET", "/api/games?platform=wii&genre=racing", None).await;
  assert_eq!(one.as_array().unwrap().len(), 1);
  assert_eq!(one[0]["Game_Title"], "Mario Kart");

  let (_, second) = call(&app, "GET", "/api/games?platform=wii&skip=1&limit=5", None).await;
  assert_eq!(second[0]["Game_Title"], "Wii Sports");

  let (_, partial) = call(&app, "GET", "/api/games?title=mario", None).await;
  assert_eq!(partial, json!([]));

  let (status, err) = call(&app, "GET", "/api/games?Publisher=Acme", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(err["detail"].as_str().unwrap().contains("Publisher"));
}

#[tokio::test]
async fn put_replaces_the_whole_record() {
  let app = app().await;
  call(&app, "POST", "/api/games", Some(foo())).await;

  let mut next = foo();
  next["Publisher"] = json!("Globex");
  next.as_object_mut().unwrap().remove("Review");
  let (status, replaced) = call(&app, "PUT", "/api/games/1", Some(next)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(replaced["id"], 1);
  assert_eq!(replaced["Publisher"], "Globex");
  assert_eq!(replaced["Review"], Value::Null);

  let mut partial = foo();
  partial.as_object_mut().unwrap().remove("Platform");
  let (status, _) = call(&app, "PUT", "/api/games/1", Some(partial)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, err) = call(&app, "PUT", "/api/games/9", Some(foo())).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["path"], "/api/games/9");
}

#[tokio::test]
async fn malformed_path_and_query_get_a_json_error_body() {
  let app = app().await;

  let (status, err) = call(&app, "GET", "/api/games/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["message"], "Something is wrong");
  assert_eq!(err["path"], "/api/games/abc");

  let (status, err) = call(&app, "POST", "/api/consoles/x/archive", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["path"], "/api/consoles/x/archive");

  let (status, err) = call(&app, "GET", "/api/games?limit=-1", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(err["detail"].as_str().unwrap().contains("limit"));
  assert_eq!(err["path"], "/api/games?limit=-1");
}

// ─── Consoles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn console_not_found_detail() {
  let app = app().await;
  let (status, err) = call(&app, "GET", "/api/consoles/3", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(err["detail"], "Console not found");
}

#[tokio::test]
async fn console_discontinued_before_release_is_400() {
  let app = app().await;
  let mut early = ps2();
  early["Discontinuation_Year"] = json!(1999);
  let (status, _) = call(&app, "POST", "/api/consoles", Some(early)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, created) = call(&app, "POST", "/api/consoles", Some(ps2())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["Type"], "Home");
}

#[tokio::test]
async fn consoles_filter_on_year_and_company() {
  let app = app().await;
  call(&app, "POST", "/api/consoles", Some(ps2())).await;
  let mut wii = ps2();
  wii["Console_Name"] = json!("Wii");
  wii["Company"] = json!("Nintendo");
  wii["Released_Year"] = json!(2006);
  call(&app, "POST", "/api/consoles", Some(wii)).await;

  let (_, hits) = call(&app, "GET", "/api/consoles?Released_Year=2006", None).await;
  assert_eq!(hits.as_array().unwrap().len(), 1);
  assert_eq!(hits[0]["Console_Name"], "Wii");

  let (_, sony) = call(&app, "GET", "/api/consoles?company=sony&Units_Sold=155", None).await;
  assert_eq!(sony[0]["Console_Name"], "PlayStation 2");
}

// ─── Subscribers ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_then_duplicate() {
  let app = app().await;

  let body = json!({ "email": "fan@example.com" });
  let (status, sub) = call(&app, "POST", "/api/subscribe", Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(sub["email"], "fan@example.com");

  let (status, _) = call(&app, "POST", "/api/subscribe", Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = call(&app, "POST", "/api/subscribe", Some(json!({ "email": "nope" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, all) = call(&app, "GET", "/api/subscribers", None).await;
  assert_eq!(all.as_array().unwrap().len(), 1);
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_reports_per_kind() {
  let app = app().await;
  let mut consoles = tempfile::NamedTempFile::new().unwrap();
  write!(
    consoles,
    "Console Name,Type,Company,Released Year,Discontinuation Year,Units Sold\n\
     Wii,Home,Nintendo,2006,2013,101.63\n\
     Bad,Home,Nintendo,year,,\n"
  )
  .unwrap();

  let body = json!({
    "consoles": consoles.path(),
    "games": "/no/such/games.csv",
  });
  let (status, report) = call(&app, "POST", "/api/import", Some(body)).await;
  assert_eq!(status, StatusCode::OK);

  assert_eq!(report["consoles"]["imported"], 1);
  assert_eq!(report["consoles"]["failed"], 1);
  assert_eq!(report["consoles"]["failures"][0]["line"], 3);
  assert_eq!(report["games"]["imported"], 0);
  assert!(report["games"]["source_error"].is_string());

  let (_, listed) = call(&app, "GET", "/api/consoles", None).await;
  assert_eq!(listed[0]["Console_Name"], "Wii");
}

#[tokio::test]
async fn import_needs_a_path() {
  let app = app().await;
  let (status, _) = call(&app, "POST", "/api/import", Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
