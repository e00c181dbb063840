use anyhow::Result;

use bibvdb_core::Config;

use super::open_bibliography;

pub fn show_record(config: &Config, identifier: &str) -> Result<()> {
    let bib = open_bibliography(config)?;
    let record = bib.get(identifier)?;

    println!("\n{} ({})", record.identifier, record.kind.as_str());
    println!("  Title:   {}", record.title);
    if let Some(authors) = &record.authors {
        println!("  Authors: {}", authors);
    }
    if let Some(year) = record.year {
        println!("  Year:    {}", year);
    }
    if let Some(summary) = &record.summary {
        println!("  Summary: {}", summary);
    }
    println!("  Added:   {}", record.created_at.to_rfc3339());
    println!("  Embedding dimension: {}", record.embedding.len());

    Ok(())
}
