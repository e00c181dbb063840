use anyhow::{Context, Result};
use std::path::PathBuf;

use bibvdb_core::{Config, NewRecord};

use super::{embedding_provider, open_bibliography};

pub async fn run_import(config: &Config, path: PathBuf) -> Result<()> {
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let fields: Vec<NewRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if fields.is_empty() {
        println!("Nothing to import: {} holds no records", path.display());
        return Ok(());
    }

    tracing::info!("Importing {} records from {}", fields.len(), path.display());

    // One provider round trip for the whole file
    let provider = embedding_provider(config)?;
    let texts: Vec<String> = fields.iter().map(NewRecord::embedding_text).collect();
    let embeddings = provider.embed_batch(&texts).await?;

    let mut bib = open_bibliography(config)?;
    let batch: Vec<_> = fields.into_iter().zip(embeddings).collect();
    let ids = bib.add_batch(batch)?;
    bib.save()?;

    println!("✓ Imported {} records from {}", ids.len(), path.display());
    Ok(())
}
