use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for bibvdb.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (BIBVDB_* prefix)
/// 3. Config file (~/.config/bibvdb/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite record database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: BIBVDB_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/bibvdb/bibvdb.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Path to the persisted vector index file.
    ///
    /// Default: ~/.local/share/bibvdb/index.bvdb
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Embedding vector dimension. Fixed per index; changing it requires
    /// rebuilding the index.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Distance metric for the vector index: "cosine" or "l2".
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Embedding provider endpoint (OpenAI-compatible /embeddings API).
    ///
    /// When unset, the CLI falls back to the deterministic local hash
    /// embedder, which is only suitable for testing.
    pub embedding_endpoint: Option<String>,

    /// Model name forwarded to the embedding provider.
    pub embedding_model: Option<String>,

    /// Timeout for embedding provider requests, in seconds.
    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    /// Default Jaro-Winkler similarity threshold for lexical search.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            index_path: default_index_path(),
            embedding_dimension: default_embedding_dimension(),
            metric: default_metric(),
            embedding_endpoint: None,
            embedding_model: None,
            embedding_timeout_secs: default_embedding_timeout_secs(),
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/bibvdb/config.toml
    /// Reads environment variables with BIBVDB_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("bibvdb");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom database path (from the --db flag).
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bibvdb")
        .join("bibvdb.db")
}

fn default_index_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bibvdb")
        .join("index.bvdb")
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_embedding_timeout_secs() -> u64 {
    30
}

fn default_fuzzy_threshold() -> f64 {
    0.85
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/bibvdb/config.toml
/// - macOS: ~/Library/Application Support/bibvdb/config.toml
/// - Windows: %APPDATA%\bibvdb\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bibvdb")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# bibvdb Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (BIBVDB_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite record database
#
# Can also be set via:
# - CLI: bibvdb --db /custom/path.db ...
# - Environment: BIBVDB_DATABASE_PATH=/custom/path.db
#database_path = "/path/to/bibvdb.db"

# Path to the persisted vector index
#index_path = "/path/to/index.bvdb"

# Embedding vector dimension. Must match the provider's output and the
# existing index; changing it requires rebuilding the index.
#embedding_dimension = 384

# Distance metric for the vector index: "cosine" or "l2"
#metric = "cosine"

# Embedding provider endpoint (OpenAI-compatible /embeddings API)
#
# When unset, the CLI falls back to a deterministic local hash embedder,
# which is only suitable for testing.
#embedding_endpoint = "https://api.openai.com/v1/embeddings"
#embedding_model = "text-embedding-3-small"

# Timeout for embedding provider requests, in seconds
#embedding_timeout_secs = 30

# Default Jaro-Winkler similarity threshold for lexical search
#fuzzy_threshold = 0.85
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert_eq!(config.embedding_dimension, 384);
        assert_eq!(config.metric, "cosine");
        assert!(config.embedding_endpoint.is_none());
        assert!((config.fuzzy_threshold - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }
}
