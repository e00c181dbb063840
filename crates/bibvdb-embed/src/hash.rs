//! Deterministic local embedding via feature hashing.
//!
//! Hashes lowercased word unigrams and bigrams onto a fixed-dimension
//! vector and L2-normalizes the result. No model, no network: similar
//! texts land near each other only to the extent that they share words,
//! which is enough for tests and offline smoke runs. Not a substitute
//! for a real embedding model.

use async_trait::async_trait;

use crate::error::{EmbedError, Result};
use crate::EmbeddingProvider;

/// Deterministic hash-based embedding provider.
#[derive(Debug, Clone)]
pub struct HashEmbedding {
    dimension: usize,
}

impl HashEmbedding {
    /// Create a provider producing vectors of the given dimension.
    ///
    /// # Errors
    /// Returns `Parse` if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbedError::Parse {
                message: "hash embedding dimension must be non-zero".to_string(),
            });
        }
        Ok(Self { dimension })
    }

    /// Embed one text. Identical inputs always produce identical vectors.
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        for token in &tokens {
            self.bump(&mut vector, token);
        }
        for pair in tokens.windows(2) {
            self.bump(&mut vector, &format!("{} {}", pair[0], pair[1]));
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm <= f32::EPSILON {
            // Empty or non-alphanumeric text: a fixed unit vector keeps
            // downstream cosine math well-defined.
            vector[0] = 1.0;
            return vector;
        }
        for value in &mut vector {
            *value /= norm;
        }
        vector
    }

    fn bump(&self, vector: &mut [f32], feature: &str) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimension as u64) as usize;
        // One hash bit picks the sign, which keeps buckets roughly
        // zero-centred across features.
        let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

/// FNV-1a, fixed here so persisted vectors stay stable across Rust
/// releases (std's `DefaultHasher` makes no such promise).
fn fnv1a(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashEmbedding {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let provider = HashEmbedding::new(64).unwrap();
        let a = provider.embed_text("Attention Is All You Need");
        let b = provider.embed_text("Attention Is All You Need");
        assert_eq!(a, b);
    }

    #[test]
    fn test_unit_norm() {
        let provider = HashEmbedding::new(64).unwrap();
        let v = provider.embed_text("some bibliography entry");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_well_defined() {
        let provider = HashEmbedding::new(16).unwrap();
        let v = provider.embed_text("");
        assert_eq!(v[0], 1.0);
        assert!(v[1..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_similar_texts_closer_than_unrelated() {
        let provider = HashEmbedding::new(256).unwrap();
        let base = provider.embed_text("attention is all you need");
        let near = provider.embed_text("attention is all you want");
        let far = provider.embed_text("organic chemistry of alkaloids");

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&base, &near) > dot(&base, &far));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashEmbedding::new(0).is_err());
    }

    #[tokio::test]
    async fn test_batch_order_preserved() {
        let provider = HashEmbedding::new(32).unwrap();
        let texts = vec!["first".to_string(), "second".to_string()];
        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed_text("first"));
        assert_eq!(batch[1], provider.embed_text("second"));
    }

    #[tokio::test]
    async fn test_single_embed_matches_batch() {
        let provider = HashEmbedding::new(32).unwrap();
        let single = provider.embed("a title").await.unwrap();
        assert_eq!(single, provider.embed_text("a title"));
    }
}
