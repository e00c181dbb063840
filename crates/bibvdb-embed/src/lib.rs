//! Embedding providers for bibvdb.
//!
//! Record text is embedded by an external provider; this crate defines
//! the provider interface and two implementations: an HTTP client for
//! OpenAI-compatible `/embeddings` endpoints, and a deterministic local
//! hash embedder for tests and offline use.
//!
//! The interface is batch-first: embedding is the dominant latency cost
//! of an `add`, so callers submit whole batches and amortize provider
//! round trips.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod error;
pub mod hash;

pub use client::HttpEmbeddingClient;
pub use error::{EmbedError, Result};
pub use hash::HashEmbedding;

use async_trait::async_trait;

/// A source of embedding vectors for record text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimension of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    ///
    /// # Errors
    /// Returns an error if the provider fails or returns vectors of the
    /// wrong dimension or count.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut batch = self.embed_batch(&texts).await?;
        batch.pop().ok_or_else(|| EmbedError::Parse {
            message: "provider returned no embedding".to_string(),
        })
    }
}
