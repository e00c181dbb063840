use anyhow::Result;

use bibvdb_core::{Config, NewRecord};

use super::{embedding_provider, open_bibliography};

pub async fn run_add(
    config: &Config,
    identifier: String,
    title: String,
    summary: Option<String>,
    authors: Option<String>,
    year: Option<i32>,
) -> Result<()> {
    let mut fields = NewRecord::new(identifier, title);
    fields.summary = summary;
    fields.authors = authors;
    fields.year = year;

    let provider = embedding_provider(config)?;
    let embedding = provider.embed(&fields.embedding_text()).await?;

    let mut bib = open_bibliography(config)?;
    let identifier = fields.identifier.clone();
    let id = bib.add(fields, embedding)?;
    bib.save()?;

    println!("✓ Added {} ({})", identifier, id);
    Ok(())
}
