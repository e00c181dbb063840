//! Exact brute-force k-NN over append-only rows.
//!
//! Every query scans all stored vectors, so results are exact: there is
//! no approximation floor to document beyond "none". Suitable for the
//! tens of thousands of records a personal bibliography holds; an ANN
//! structure can replace this behind the same interface if that stops
//! being true.

use std::cmp::Ordering;

use crate::error::{IndexError, Result};
use crate::metric::Metric;

/// A single k-NN result: the row, its record identifier, and the
/// distance under the index metric (ascending is better).
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub identifier: String,
    pub distance: f32,
}

/// Exact nearest-neighbour index over record embeddings.
///
/// Rows are append-only. The row id equals the insertion order and is
/// stable for the lifetime of the index; each row maps to the DOI/ISBN
/// identifier of the record it was inserted for.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    metric: Metric,
    /// Row-major flattened vectors, `dimension` floats per row.
    vectors: Vec<f32>,
    /// Row id -> record identifier.
    identifiers: Vec<String>,
}

impl FlatIndex {
    /// Create an empty index.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `dimension` is zero.
    pub fn new(dimension: usize, metric: Metric) -> Result<Self> {
        if dimension == 0 {
            return Err(IndexError::InvalidParameter(
                "dimension must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            metric,
            vectors: Vec::new(),
            identifiers: Vec::new(),
        })
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of rows in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// The record identifier stored at `row`, if any.
    #[must_use]
    pub fn identifier(&self, row: usize) -> Option<&str> {
        self.identifiers.get(row).map(String::as_str)
    }

    /// The vector stored at `row`, if any.
    #[must_use]
    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    /// Insert a vector for the given record identifier, returning the
    /// new row id.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the vector length differs from the
    /// index dimension.
    pub fn insert(&mut self, vector: &[f32], identifier: impl Into<String>) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let row = self.identifiers.len();
        self.vectors.extend_from_slice(vector);
        self.identifiers.push(identifier.into());
        Ok(row)
    }

    /// Find the `k` nearest rows to `query`.
    ///
    /// Results are sorted ascending by distance, with ties broken by
    /// identifier lexical order so identical inputs always yield
    /// identical output. Returns fewer than `k` results, without error,
    /// when the index holds fewer rows.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the query length differs from the
    /// index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .identifiers
            .iter()
            .enumerate()
            .map(|(row, identifier)| {
                let start = row * self.dimension;
                let vector = &self.vectors[start..start + self.dimension];
                Neighbor {
                    row,
                    identifier: identifier.clone(),
                    distance: self.metric.distance(query, vector),
                }
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    /// Iterate over `(row, identifier, vector)` triples in row order.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &str, &[f32])> {
        self.identifiers.iter().enumerate().map(|(row, id)| {
            let start = row * self.dimension;
            (
                row,
                id.as_str(),
                &self.vectors[start..start + self.dimension],
            )
        })
    }
}
