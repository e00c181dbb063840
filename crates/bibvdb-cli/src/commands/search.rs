use anyhow::{Context, Result};

use bibvdb_core::Config;
use bibvdb_search::{SearchHit, SearchMode};

use super::{embedding_provider, open_bibliography};

pub async fn run_search(
    config: &Config,
    query: &str,
    mode: &str,
    k: usize,
    threshold: Option<f64>,
) -> Result<()> {
    let mode: SearchMode = mode.parse().context("Invalid search mode")?;
    let threshold = threshold.unwrap_or(config.fuzzy_threshold);

    let bib = open_bibliography(config)?;

    let hits = match mode {
        SearchMode::Semantic => {
            let provider = embedding_provider(config)?;
            let query_vec = provider.embed(query).await?;
            bib.semantic_search(&query_vec, k)?
        }
        SearchMode::Lexical => bib.lexical_search(query, threshold, k)?,
        SearchMode::Hybrid => {
            let provider = embedding_provider(config)?;
            let query_vec = provider.embed(query).await?;
            bib.hybrid_search(&query_vec, query, k)?
        }
    };

    if hits.is_empty() {
        println!("No results for \"{query}\" ({mode})");
        return Ok(());
    }

    let records = bib.resolve(&hits)?;

    println!("\n{} results for \"{query}\" ({mode}):\n", hits.len());
    for (hit, record) in hits.iter().zip(&records) {
        println!("  {}  {}", format_score(hit), record.identifier);
        println!("        {}", record.title);
        if let Some(authors) = &record.authors {
            println!("        {}", authors);
        }
    }
    println!();

    Ok(())
}

fn format_score(hit: &SearchHit) -> String {
    match hit.mode {
        // Distance: lower is better
        SearchMode::Semantic => format!("d={:.4}", hit.score),
        // Similarity / fused rank score: higher is better
        SearchMode::Lexical | SearchMode::Hybrid => format!("s={:.4}", hit.score),
    }
}
