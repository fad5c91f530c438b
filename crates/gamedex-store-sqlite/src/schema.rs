//! SQL schema for the Gamedex SQLite store.
//!
//! Executed once at connection startup. Column names match the canonical
//! record field names so the flat-file and SQLite layouts line up.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT: ids of deleted rows are never handed out again.
CREATE TABLE IF NOT EXISTS games (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    "Rank"          INTEGER NOT NULL,   -- business attribute, not unique
    "Game_Title"    TEXT    NOT NULL,
    "Platform"      TEXT    NOT NULL,
    "Year"          INTEGER,
    "Genre"         TEXT    NOT NULL,
    "Publisher"     TEXT    NOT NULL,
    "North_America" REAL,
    "Europe"        REAL,
    "Japan"         REAL,
    "Rest_of_World" REAL,
    "Global"        REAL    NOT NULL,
    "Review"        TEXT
);

CREATE TABLE IF NOT EXISTS consoles (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    "Console_Name"         TEXT    NOT NULL,
    "Type"                 TEXT    NOT NULL,
    "Company"              TEXT    NOT NULL,
    "Released_Year"        INTEGER NOT NULL,
    "Discontinuation_Year" INTEGER,
    "Units_Sold"           REAL
);

-- Archives are append-only. `id` is the id the row had while active; it is
-- not a foreign key and not unique.
CREATE TABLE IF NOT EXISTS archived_games (
    archive_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    id              INTEGER NOT NULL,
    "Rank"          INTEGER NOT NULL,
    "Game_Title"    TEXT    NOT NULL,
    "Platform"      TEXT    NOT NULL,
    "Year"          INTEGER,
    "Genre"         TEXT    NOT NULL,
    "Publisher"     TEXT    NOT NULL,
    "North_America" REAL,
    "Europe"        REAL,
    "Japan"         REAL,
    "Rest_of_World" REAL,
    "Global"        REAL    NOT NULL,
    "Review"        TEXT,
    archived_at     TEXT    NOT NULL    -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS archived_consoles (
    archive_id             INTEGER PRIMARY KEY AUTOINCREMENT,
    id                     INTEGER NOT NULL,
    "Console_Name"         TEXT    NOT NULL,
    "Type"                 TEXT    NOT NULL,
    "Company"              TEXT    NOT NULL,
    "Released_Year"        INTEGER NOT NULL,
    "Discontinuation_Year" INTEGER,
    "Units_Sold"           REAL,
    archived_at            TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS subscribers (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    subscribed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS games_rank_idx          ON games("Rank");
CREATE INDEX IF NOT EXISTS archived_games_id_idx    ON archived_games(id);
CREATE INDEX IF NOT EXISTS archived_consoles_id_idx ON archived_consoles(id);

PRAGMA user_version = 1;
"#;
