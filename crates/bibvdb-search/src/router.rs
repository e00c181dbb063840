//! Query routing and hybrid rank fusion.
//!
//! Semantic scores are distances (ascending is better) and lexical
//! scores are Jaro-Winkler similarities (descending is better); the two
//! scales are incompatible, so hybrid results are merged by rank, never
//! by raw score.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// RRF dampening constant. The standard value from the literature;
/// larger values flatten the contribution of top ranks.
const RRF_K: f64 = 60.0;

/// Which lookup modality a search request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Embedding distance over the vector index.
    #[default]
    Semantic,
    /// Jaro-Winkler similarity over identifiers and titles.
    Lexical,
    /// Both, merged with reciprocal rank fusion.
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Lexical => write!(f, "lexical"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "lexical" => Ok(Self::Lexical),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(SearchError::InvalidQuery(format!(
                "unknown search mode: {other} (expected semantic, lexical, or hybrid)"
            ))),
        }
    }
}

/// One search result.
///
/// The meaning of `score` depends on `mode`: a distance for semantic
/// hits (lower is better), a similarity in [0, 1] for lexical hits
/// (higher is better), and a fused RRF score for hybrid hits (higher is
/// better). Scores from different modes are not comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub identifier: String,
    pub score: f64,
    pub mode: SearchMode,
}

/// Merge two ranked result lists with reciprocal rank fusion.
///
/// Each list contributes `1 / (60 + rank)` per entry (rank starting at
/// 1); entries present in both lists sum their contributions. Input
/// lists must already be in their mode's best-first order. Output is
/// descending by fused score, ties broken by identifier, truncated to
/// `k`.
#[must_use]
pub fn reciprocal_rank_fusion(
    semantic: &[SearchHit],
    lexical: &[SearchHit],
    k: usize,
) -> Vec<SearchHit> {
    // BTreeMap keeps identifier iteration order stable before the sort.
    let mut fused: BTreeMap<&str, f64> = BTreeMap::new();

    for list in [semantic, lexical] {
        for (rank, hit) in list.iter().enumerate() {
            let contribution = 1.0 / (RRF_K + rank as f64 + 1.0);
            *fused.entry(hit.identifier.as_str()).or_insert(0.0) += contribution;
        }
    }

    let mut hits: Vec<SearchHit> = fused
        .into_iter()
        .map(|(identifier, score)| SearchHit {
            identifier: identifier.to_string(),
            score,
            mode: SearchMode::Hybrid,
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    hits.truncate(k);
    hits
}
