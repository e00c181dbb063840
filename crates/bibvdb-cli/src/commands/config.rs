use anyhow::Result;

use bibvdb_core::{config, Config};

#[derive(Debug, clap::Subcommand)]
pub enum ConfigAction {
    /// Create the config file with documented defaults
    Init,
    /// Show the current effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example configuration
    Example,
}

pub fn run(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => init_config(),
        ConfigAction::Show => show_config(),
        ConfigAction::Path => show_path(),
        ConfigAction::Example => show_example(),
    }
}

/// Show the current effective configuration.
fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  index_path: {}", config.index_path.display());
    println!("  embedding_dimension: {}", config.embedding_dimension);
    println!("  metric: {}", config.metric);
    println!(
        "  embedding_endpoint: {}",
        config.embedding_endpoint.as_deref().unwrap_or("<not set>")
    );
    println!(
        "  embedding_model: {}",
        config.embedding_model.as_deref().unwrap_or("<not set>")
    );
    println!("  embedding_timeout_secs: {}", config.embedding_timeout_secs);
    println!("  fuzzy_threshold: {}", config.fuzzy_threshold);

    println!("\nPriority: CLI args > ENV vars (BIBVDB_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure bibvdb.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
