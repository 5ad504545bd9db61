//! shelfdb CLI
//!
//! Command-line tools for shelfdb store management.
//!
//! # Commands
//!
//! - `init` - Create a store with a chosen partition count
//! - `inspect` - Display store layout, collections and indexes
//! - `add-collection` / `remove-collection` - Collection administration
//! - `add-index` - Register an index field locator on a collection
//! - `set` / `get` - Read and write single documents

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// shelfdb command-line store tools.
#[derive(Parser)]
#[command(name = "shelfdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store's document root
    #[arg(global = true, short, long)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a store at the document root
    Init {
        /// Number of partition directories per collection
        #[arg(short, long, default_value = "16")]
        partitions: u64,
    },

    /// Display store layout, collections and indexes
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Create and register a collection
    AddCollection {
        /// Name of the collection
        name: String,
    },

    /// Unregister a collection and delete its data
    RemoveCollection {
        /// Name of the collection
        name: String,
    },

    /// Register an index field locator on a collection
    AddIndex {
        /// Name of the collection
        collection: String,

        /// Dotted field locator, e.g. profile.age
        field_locator: String,
    },

    /// Write a document from an argument, file or stdin
    Set {
        /// Name of the collection
        collection: String,

        /// Document key
        key: String,

        /// Inline payload (omit to read from --input or stdin)
        value: Option<String>,

        /// Read the payload from a file
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Read a document to stdout or a file
    Get {
        /// Name of the collection
        collection: String,

        /// Document key
        key: String,

        /// Write the payload to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let root = |cli: &Cli| -> Result<PathBuf, Box<dyn std::error::Error>> {
        cli.root
            .clone()
            .ok_or_else(|| "store root required (--root)".into())
    };

    match &cli.command {
        Commands::Init { partitions } => {
            commands::admin::init(&root(&cli)?, *partitions)?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&root(&cli)?, format)?;
        }
        Commands::AddCollection { name } => {
            commands::admin::add_collection(&root(&cli)?, name)?;
        }
        Commands::RemoveCollection { name } => {
            commands::admin::remove_collection(&root(&cli)?, name)?;
        }
        Commands::AddIndex {
            collection,
            field_locator,
        } => {
            commands::admin::add_index(&root(&cli)?, collection, field_locator)?;
        }
        Commands::Set {
            collection,
            key,
            value,
            input,
        } => {
            commands::documents::set(
                &root(&cli)?,
                collection,
                key,
                value.as_deref(),
                input.as_deref(),
            )?;
        }
        Commands::Get {
            collection,
            key,
            output,
        } => {
            commands::documents::get(&root(&cli)?, collection, key, output.as_deref())?;
        }
        Commands::Version => {
            println!("shelfdb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("shelfdb Core v{}", shelfdb_core::VERSION);
        }
    }

    Ok(())
}
