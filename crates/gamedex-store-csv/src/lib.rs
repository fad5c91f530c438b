//! Flat-file backend for the Gamedex catalog.
//!
//! One CSV file per table inside a data directory:
//!
//! | file                   | columns                          |
//! |------------------------|----------------------------------|
//! | `games.csv`            | `id` + game fields               |
//! | `consoles.csv`         | `id` + console fields            |
//! | `deleted_games.csv`    | `id` + game fields + `archived_at`    |
//! | `deleted_consoles.csv` | `id` + console fields + `archived_at` |
//! | `subscribers.csv`      | `id`, `email`, `subscribed_at`   |
//!
//! Inserts append; updates and deletes rewrite the whole file through a
//! temporary sibling and a rename. Every operation holds one async mutex.

mod store;
mod table;

pub mod error;

pub use error::{Error, Result};
pub use store::CsvStore;
