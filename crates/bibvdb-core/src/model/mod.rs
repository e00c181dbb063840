//! Bibliographic record model.

pub mod ids;
pub mod record;

pub use ids::RecordId;
pub use record::{IdentifierKind, NewRecord, Record};
