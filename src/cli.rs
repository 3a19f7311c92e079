use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docsite-index")]
#[command(about = "Inspect the navigation tables of generated rustdoc sites", long_about = None)]
pub struct Cli {
    /// rustdoc output directory (defaults to the config file, then target/doc)
    #[arg(short, long, global = true)]
    pub doc_dir: Option<PathBuf>,
    /// Configuration file (defaults to ./docsite-index.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Always rescan instead of using the snapshot cache
    #[arg(long, global = true)]
    pub no_cache: bool,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the types implementing a trait
    Implementors { trait_path: String },
    /// List the traits a type implements
    Traits { type_path: String },
    /// Show the sidebar items of a module page
    Page { module_path: String },
    /// List documented crates, traits and module pages
    Summary,
    /// Validate every table; exits non-zero on violations
    Check,
    /// Parse a single script and print its table
    Dump { file: PathBuf },
    /// Suggest known paths similar to a query
    Suggest {
        query: String,
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}
