//! RFC 4180 CSV codec for Gamedex.
//!
//! Reads rows lazily from a string and writes rows with minimal quoting.
//! Pure synchronous; no I/O.
//!
//! # Quick start
//!
//! ```
//! let mut out = String::new();
//! gamedex_csv::write_row(&mut out, ["Rank", "Game_Title"]);
//! gamedex_csv::write_row(&mut out, ["1", "Foo, the game"]);
//!
//! let rows: Vec<_> = gamedex_csv::rows(&out).collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows[1].cells, ["1", "Foo, the game"]);
//! ```

pub mod error;
mod read;
mod write;

pub use error::{Error, Result};
pub use read::{Row, Rows};
pub use write::{escape, write_row};

/// Iterate the rows of `input`. Blank lines are skipped and a leading UTF-8
/// byte-order mark is ignored.
///
/// A malformed row yields `Err(…)` in its position; reading resumes on the
/// following line, so one bad row does not hide the rest of the file.
pub fn rows(input: &str) -> Rows<'_> { Rows::new(input) }
