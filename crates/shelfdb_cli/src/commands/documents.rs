//! Single-document read and write commands.

use shelfdb_core::Client;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Writes a document from an inline value, a file, or stdin.
pub fn set(
    root: &Path,
    collection: &str,
    key: &str,
    value: Option<&str>,
    input: Option<&Path>,
) -> CliResult {
    let client = Client::open_existing(root)?;

    match (value, input) {
        (Some(_), Some(_)) => {
            return Err("provide an inline value or --input, not both".into());
        }
        (Some(value), None) => {
            client.set(collection, key, value.as_bytes())?;
        }
        (None, Some(path)) => {
            client.set_from_reader(collection, key, File::open(path)?)?;
        }
        (None, None) => {
            client.set_from_reader(collection, key, io::stdin().lock())?;
        }
    }

    println!("wrote {collection}/{key}");
    Ok(())
}

/// Reads a document to stdout or a file.
pub fn get(root: &Path, collection: &str, key: &str, output: Option<&Path>) -> CliResult {
    let client = Client::open_existing(root)?;

    match output {
        Some(path) => {
            client.get_into_writer(collection, key, File::create(path)?)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            client.get_into_writer(collection, key, &mut lock)?;
            lock.flush()?;
        }
    }

    Ok(())
}
