pub mod add;
pub mod config;
pub mod get;
pub mod import;
pub mod search;
pub mod status;

pub use add::run_add;
pub use get::show_record;
pub use import::run_import;
pub use search::run_search;
pub use status::show_status;

use anyhow::{Context, Result};
use std::time::Duration;

use bibvdb_core::Config;
use bibvdb_embed::{EmbeddingProvider, HashEmbedding, HttpEmbeddingClient};
use bibvdb_index::Metric;
use bibvdb_search::Bibliography;

/// Open the bibliography from the effective configuration.
pub fn open_bibliography(config: &Config) -> Result<Bibliography> {
    let metric: Metric = config
        .metric
        .parse()
        .context("Invalid metric in configuration")?;
    Bibliography::open(
        &config.database_path,
        &config.index_path,
        config.embedding_dimension,
        metric,
    )
    .context("Failed to open bibliography")
}

/// Build the configured embedding provider.
///
/// Falls back to the deterministic local hash embedder when no endpoint
/// is configured.
pub fn embedding_provider(config: &Config) -> Result<Box<dyn EmbeddingProvider>> {
    match &config.embedding_endpoint {
        Some(endpoint) => {
            let client = HttpEmbeddingClient::new(
                endpoint.clone(),
                config.embedding_model.clone(),
                config.embedding_dimension,
                Duration::from_secs(config.embedding_timeout_secs),
            )
            .context("Failed to create embedding client")?;
            Ok(Box::new(client))
        }
        None => {
            tracing::warn!(
                "No embedding endpoint configured, using local hash embedder \
                 (fine for testing, not for real semantic search)"
            );
            let provider = HashEmbedding::new(config.embedding_dimension)
                .context("Failed to create hash embedder")?;
            Ok(Box::new(provider))
        }
    }
}
