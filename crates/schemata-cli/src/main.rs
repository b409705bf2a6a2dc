mod cli;
mod commands;
mod config;
mod definition;
mod observability;
mod output;

use anyhow::{Result, anyhow};
use clap::Parser;
use schemata_db_memory::MemoryManagers;
use schemata_schema::Schemas;
use tracing::debug;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    // A missing .env is fine.
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    observability::init_tracing_with_level("warn");

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let app_config = config::loader::load_config(cli.config.as_deref()).map_err(|e| anyhow!(e))?;
    observability::apply_logging_level(&app_config.logging.level);
    debug!(settings = ?app_config.schema, "Loaded configuration");

    let managers = MemoryManagers::new();
    let schemas = Schemas::builder(managers.clone())
        .settings(app_config.schema.clone())
        .tag_vocabulary(managers.clone())
        .build();

    match &cli.command {
        Commands::Compose(args) => {
            commands::compose::run(&schemas, &args.definition, args.type_name.as_deref(), format)?;
        }
        Commands::Import(args) => {
            commands::import::run(&schemas, &managers, args, format).await?;
        }
        Commands::Export(args) => {
            commands::export::run(&schemas, args).await?;
        }
        Commands::Index(args) => {
            commands::index::run(&schemas, args, format)?;
        }
    }

    Ok(())
}
