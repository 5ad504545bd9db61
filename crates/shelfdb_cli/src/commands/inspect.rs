//! Inspect command implementation.

use serde::Serialize;
use shelfdb_core::Client;
use std::fs;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Document root path.
    pub root: String,
    /// Warehouse path holding all store data.
    pub warehouse: String,
    /// Partition count the store was created with.
    pub num_partitions: u64,
    /// Per-collection statistics.
    pub collections: Vec<CollectionStats>,
}

/// Statistics for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of stored documents.
    pub document_count: usize,
    /// Total data size in bytes.
    pub data_size: u64,
    /// Registered index field locators, sorted.
    pub indexes: Vec<String>,
}

/// Runs the inspect command.
pub fn run(root: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::open_existing(root)?;

    let mut collections = Vec::new();
    for name in client.collection_names() {
        let mut indexes: Vec<String> = client.indexes(&name)?.keys().cloned().collect();
        indexes.sort();

        let data_dir = client
            .warehouse_path()
            .join("data")
            .join(&name)
            .join("data");
        let (document_count, data_size) = walk_stats(&data_dir)?;

        collections.push(CollectionStats {
            name,
            document_count,
            data_size,
            indexes,
        });
    }

    let result = InspectResult {
        root: root.display().to_string(),
        warehouse: client.warehouse_path().display().to_string(),
        num_partitions: client.config().num_partitions,
        collections,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&result),
    }

    Ok(())
}

fn print_text(result: &InspectResult) {
    println!("store: {}", result.root);
    println!("warehouse: {}", result.warehouse);
    println!("partitions: {}", result.num_partitions);
    println!("collections: {}", result.collections.len());

    for coll in &result.collections {
        println!(
            "  {} - {} documents, {} bytes",
            coll.name, coll.document_count, coll.data_size
        );
        for locator in &coll.indexes {
            println!("    index: {locator}");
        }
    }
}

/// Counts documents and sums file sizes under a collection data dir.
fn walk_stats(dir: &Path) -> Result<(usize, u64), std::io::Error> {
    let mut count = 0;
    let mut size = 0;

    if !dir.exists() {
        return Ok((0, 0));
    }

    for partition in fs::read_dir(dir)? {
        let partition = partition?.path();
        if !partition.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&partition)? {
            let entry = entry?;
            if entry.path().is_file() {
                count += 1;
                size += entry.metadata()?.len();
            }
        }
    }

    Ok((count, size))
}
