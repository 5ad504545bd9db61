//! Store and collection administration commands.

use shelfdb_core::{Client, Config};
use std::path::Path;
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Creates a store at the document root with the given partition count.
pub fn init(root: &Path, partitions: u64) -> CliResult {
    std::fs::create_dir_all(root)?;
    let client = Client::open(Config::new(root, partitions))?;

    info!(warehouse = %client.warehouse_path().display(), "store initialized");
    println!(
        "initialized store at {} ({} partitions)",
        client.warehouse_path().display(),
        partitions
    );
    Ok(())
}

/// Creates and registers a collection.
pub fn add_collection(root: &Path, name: &str) -> CliResult {
    let client = Client::open_existing(root)?;
    client.add_collection(name)?;
    println!("added collection {name}");
    Ok(())
}

/// Unregisters a collection and deletes its data.
pub fn remove_collection(root: &Path, name: &str) -> CliResult {
    let client = Client::open_existing(root)?;
    client.remove_collection(name)?;
    println!("removed collection {name}");
    Ok(())
}

/// Registers an index field locator on a collection.
pub fn add_index(root: &Path, collection: &str, field_locator: &str) -> CliResult {
    let client = Client::open_existing(root)?;
    client.add_index(collection, field_locator)?;
    println!("added index on {collection}: {field_locator}");
    Ok(())
}
