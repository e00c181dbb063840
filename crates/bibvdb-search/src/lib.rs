//! Search for bibvdb.
//!
//! Two lookup modalities over the record store: semantic similarity
//! over embedding vectors (via `bibvdb-index`) and lexical fuzzy
//! similarity over identifiers and titles (Jaro-Winkler). The query
//! router dispatches by mode and merges hybrid results with rank-based
//! fusion; the `Bibliography` facade wires store, index, and matcher
//! together behind one add/search API.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod bibliography;
pub mod error;
pub mod fuzzy;
pub mod router;

pub use bibliography::Bibliography;
pub use error::{Result, SearchError};
pub use fuzzy::{FuzzyMatch, FuzzyMatcher};
pub use router::{reciprocal_rank_fusion, SearchHit, SearchMode};
