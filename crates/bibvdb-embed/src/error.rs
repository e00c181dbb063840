//! Embedding provider error types.

use thiserror::Error;

/// Errors that can occur while generating embeddings.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// An HTTP request to the provider failed (includes timeouts).
    #[error("HTTP error from embedding provider: {message}")]
    Http { message: String },

    /// The provider returned a rate-limit response.
    #[error("rate limited by embedding provider")]
    RateLimited,

    /// A provider response could not be parsed.
    #[error("parse error from embedding provider: {message}")]
    Parse { message: String },

    /// The provider returned vectors of an unexpected dimension.
    #[error("dimension mismatch: expected {expected}, provider returned {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, EmbedError>;
