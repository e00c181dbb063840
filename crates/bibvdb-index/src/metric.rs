use std::fmt;
use std::str::FromStr;

use crate::error::IndexError;

/// Distance metric for the vector index.
///
/// Fixed at index creation and recorded in the persisted header.
/// Distances from different metrics are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Cosine distance: `1 - cos(a, b)`, in [0, 2]. Zero-norm vectors
    /// are treated as maximally distant from everything.
    #[default]
    Cosine,
    /// Euclidean (L2) distance.
    L2,
}

impl Metric {
    /// Compute the distance between two vectors of equal dimension.
    ///
    /// Callers are responsible for the dimension check; slices of unequal
    /// length are truncated to the shorter by `zip`.
    #[must_use]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_distance(a, b),
            Self::L2 => l2_distance(a, b),
        }
    }

    /// Stable single-byte tag used in the on-disk header.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Cosine => 0,
            Self::L2 => 1,
        }
    }

    /// Inverse of [`Metric::tag`].
    pub fn from_tag(tag: u8) -> Result<Self, IndexError> {
        match tag {
            0 => Ok(Self::Cosine),
            1 => Ok(Self::L2),
            other => Err(IndexError::Corrupt(format!("unknown metric tag {other}"))),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::L2 => write!(f, "l2"),
        }
    }
}

impl FromStr for Metric {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "l2" | "euclidean" => Ok(Self::L2),
            other => Err(IndexError::InvalidParameter(format!(
                "unknown metric: {other} (expected \"cosine\" or \"l2\")"
            ))),
        }
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        // Zero vectors carry no direction
        return 2.0;
    }
    // Clamp against float drift so identical vectors report exactly 0
    (1.0 - (dot / denom)).clamp(0.0, 2.0)
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
