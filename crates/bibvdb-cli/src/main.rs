use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "bibvdb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the record database (default: ~/.local/share/bibvdb/bibvdb.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Add a bibliographic record
    ///
    /// The record is keyed by its DOI or ISBN. Its title (plus abstract,
    /// when given) is embedded via the configured provider and inserted
    /// into the vector index; the identifier and title are registered for
    /// fuzzy lookup. Re-adding an existing identifier is rejected.
    Add {
        /// DOI (e.g. 10.1000/xyz) or ISBN (e.g. 978-0-306-40615-7)
        identifier: String,
        /// Record title
        title: String,
        /// Abstract or other descriptive text
        #[arg(long)]
        summary: Option<String>,
        /// Authors, free-form
        #[arg(long)]
        authors: Option<String>,
        /// Publication year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Import records from a JSON file
    ///
    /// The file holds an array of objects with "identifier" and "title"
    /// fields plus optional "summary", "authors", and "year". The whole
    /// batch is embedded in one provider round trip and validated before
    /// any record is written.
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Search the bibliography
    Search {
        /// Query text
        query: String,
        /// Search mode: semantic, lexical, or hybrid
        #[arg(long, default_value = "semantic")]
        mode: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        k: usize,
        /// Jaro-Winkler similarity threshold for lexical search
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Show a record by its DOI/ISBN
    Get {
        /// DOI or ISBN
        identifier: String,
    },
    /// Show database status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.db {
        Some(db_path) => bibvdb_core::Config::load_with_db_path(db_path)?,
        None => bibvdb_core::Config::load()?,
    };

    // Ensure database directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Add {
            identifier,
            title,
            summary,
            authors,
            year,
        } => {
            commands::run_add(&config, identifier, title, summary, authors, year).await?;
        }
        Commands::Import { path } => {
            commands::run_import(&config, path).await?;
        }
        Commands::Search {
            query,
            mode,
            k,
            threshold,
        } => {
            commands::run_search(&config, &query, &mode, k, threshold).await?;
        }
        Commands::Get { identifier } => {
            commands::show_record(&config, &identifier)?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
        Commands::Config { action } => {
            commands::config::run(&action)?;
        }
    }

    Ok(())
}
