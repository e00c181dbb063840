//! SQLite-backed record store.

pub mod db;
pub mod migrations;

pub use db::RecordStore;
