//! HTTP client for OpenAI-compatible embedding endpoints.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};
use crate::EmbeddingProvider;

/// Embedding provider backed by an OpenAI-compatible `/embeddings` API.
///
/// Requests carry a hard timeout; transient failures (network errors,
/// rate limits) are retried with exponential backoff.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClient {
    http: Client,
    endpoint: String,
    model: Option<String>,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbeddingClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        endpoint: impl Into<String>,
        model: Option<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("bibvdb/0.1.0 (https://github.com/oxur/bibvdb)")
            .build()
            .map_err(|e| EmbedError::Http {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            model,
            dimension,
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest {
            input: texts,
            model: self.model.as_deref(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Http {
                message: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbedError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(EmbedError::Http {
                message: format!("status {}", response.status()),
            });
        }

        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| EmbedError::Parse {
                message: e.to_string(),
            })?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedError::Parse {
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    texts.len(),
                    parsed.data.len()
                ),
            });
        }

        // Providers may return rows out of order; the index field is
        // authoritative.
        let mut rows = parsed.data;
        rows.sort_by_key(|row| row.index);

        let mut embeddings = Vec::with_capacity(rows.len());
        for row in rows {
            if row.embedding.len() != self.dimension {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.dimension,
                    actual: row.embedding.len(),
                });
            }
            embeddings.push(row.embedding);
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Embedding batch of {} texts", texts.len());

        (|| self.request(texts))
            .retry(ExponentialBuilder::default().with_max_times(3))
            .when(|e| matches!(e, EmbedError::Http { .. } | EmbedError::RateLimited))
            .notify(|err, dur| {
                tracing::warn!("Embedding request failed ({err}), retrying in {dur:?}");
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = HttpEmbeddingClient::new(
            "http://localhost:8080/embeddings",
            Some("test-model".to_string()),
            384,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.dimension(), 384);
    }

    #[test]
    fn test_request_body_shape() {
        let texts = vec!["hello".to_string()];
        let body = EmbeddingRequest {
            input: &texts,
            model: Some("m"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["input"][0], "hello");
        assert_eq!(json["model"], "m");

        let no_model = EmbeddingRequest {
            input: &texts,
            model: None,
        };
        let json = serde_json::to_value(&no_model).unwrap();
        assert!(json.get("model").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"data":[{"index":1,"embedding":[0.5,0.5]},{"index":0,"embedding":[1.0,0.0]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].index, 1);
    }
}
