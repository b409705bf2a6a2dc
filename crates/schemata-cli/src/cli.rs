use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "schemata")]
#[command(about = "Compose content schemas and convert records with them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./schemata.toml when present)
    #[arg(short, long, global = true, env = "SCHEMATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose every type of a definition file and print the schemas
    Compose(ComposeArgs),
    /// Convert CSV rows into records of a type
    Import(ImportArgs),
    /// Export JSON records of a type as CSV
    Export(ExportArgs),
    /// Print the search texts of JSON records of a type
    Index(IndexArgs),
}

#[derive(clap::Args)]
pub struct ComposeArgs {
    /// Definition file (TOML with [[types]] entries)
    pub definition: PathBuf,
    /// Only this type
    #[arg(short = 't', long = "type")]
    pub type_name: Option<String>,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Definition file (TOML with [[types]] entries)
    pub definition: PathBuf,
    /// Type to import
    #[arg(short = 't', long = "type")]
    pub type_name: String,
    /// CSV file with a header row
    #[arg(long)]
    pub csv: PathBuf,
    /// JSON file mapping type names to existing records, used to resolve joins
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Definition file (TOML with [[types]] entries)
    pub definition: PathBuf,
    /// Type to export
    #[arg(short = 't', long = "type")]
    pub type_name: String,
    /// JSON file holding an array of records (reads from stdin if omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct IndexArgs {
    /// Definition file (TOML with [[types]] entries)
    pub definition: PathBuf,
    /// Type to index
    #[arg(short = 't', long = "type")]
    pub type_name: String,
    /// JSON file holding an array of records (reads from stdin if omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,
}
