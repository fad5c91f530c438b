//! Core types and trait definitions for the Gamedex catalog.
//!
//! This crate has no HTTP or database dependencies.
//! Storage backends implement the traits in [`store`]; the HTTP layers and
//! the importer drive them through [`lifecycle::Lifecycle`] and
//! [`subscriber::Registry`].

// Store traits spell out `+ Send` on their futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod console;
pub mod error;
pub mod fields;
pub mod filter;
pub mod game;
pub mod lifecycle;
pub mod patch;
pub mod record;
pub mod store;
pub mod subscriber;
pub mod validate;

pub use error::{Error, Result};
