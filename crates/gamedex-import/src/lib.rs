//! Bulk CSV import for the Gamedex catalog.
//!
//! An [`Importer`] reads a CSV source, coerces each row into a record,
//! validates it, and commits valid rows to a [`RecordStore`] in batches.
//! Bad rows are counted and reported, never raised.
//!
//! [`RecordStore`]: gamedex_core::store::RecordStore

pub mod error;
mod importer;
mod summary;

pub use error::{Error, Result};
pub use importer::{DEFAULT_BATCH_SIZE, Importer};
pub use summary::{ImportSummary, RowFailure};

#[cfg(test)]
mod tests;
