use anyhow::Result;

use bibvdb_core::Config;

use super::open_bibliography;

pub fn show_status(config: &Config) -> Result<()> {
    let bib = open_bibliography(config)?;
    let count = bib.len()?;

    println!("\n📊 bibvdb Status\n");
    println!("  Database:  {}", config.database_path.display());
    println!("  Index:     {}", config.index_path.display());
    println!("  Records:   {}", count);
    println!("  Dimension: {}", bib.dimension());
    println!("  Metric:    {}", bib.metric());
    println!(
        "  Embedding: {}",
        config
            .embedding_endpoint
            .as_deref()
            .unwrap_or("<local hash embedder>")
    );

    if count == 0 {
        println!("\n  Run `bibvdb add <doi-or-isbn> <title>` to add your first record");
    }

    Ok(())
}
