//! Vector index for bibvdb.
//!
//! An exact (brute-force) k-nearest-neighbour index over bibliographic
//! record embeddings, with a versioned on-disk format. The index is
//! append-only: row ids are assigned in insertion order and remain
//! stable for the lifetime of the index. The distance metric is fixed
//! at creation and recorded in the persisted header, so an index can
//! never silently mix metrics across queries.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod flat;
pub mod metric;
pub mod persist;

pub use error::{IndexError, Result};
pub use flat::{FlatIndex, Neighbor};
pub use metric::Metric;
