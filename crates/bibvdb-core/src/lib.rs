//! Core domain model for bibvdb.
//!
//! This crate defines bibliographic records keyed by DOI/ISBN, the
//! SQLite record store, and layered configuration loading.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{IdentifierKind, NewRecord, Record, RecordId};
pub use store::RecordStore;
