//! Client facade and store lifecycle.

use crate::collection::{Collection, CollectionMeta, IndexInfo};
use crate::config::Config;
use crate::dir::{StoreDir, StoreMeta};
use crate::error::{StoreError, StoreResult};
use crate::registry::CollectionRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The primary handle an application uses to save and fetch data.
///
/// A `Client` owns the store configuration, the warehouse directory
/// (and its exclusive lock), and the collection registry. All keyed
/// operations resolve the named collection against the registry under a
/// read lock and then delegate to a [`Collection`] handle built from a
/// snapshot of that collection's metadata.
///
/// Exactly one live `Client` can exist per document root; a second open
/// fails with [`StoreError::StoreLocked`] until the first is dropped.
///
/// # Example
///
/// ```rust,ignore
/// use shelfdb_core::{Client, Config};
///
/// let client = Client::open(Config::new("/var/lib/myapp", 16))?;
/// client.add_collection("users")?;
/// client.set("users", "u1", b"hello")?;
/// assert_eq!(client.get("users", "u1")?, b"hello");
/// ```
pub struct Client {
    config: Config,
    dir: Arc<StoreDir>,
    registry: CollectionRegistry,
    /// Guards one-time initialization: set on open, cleared by
    /// `destroy`. Operations on a destroyed client are refused.
    is_open: RwLock<bool>,
}

impl Client {
    /// Opens a store, validating configuration and loading persisted
    /// metadata.
    ///
    /// The warehouse subdirectory is appended to `document_root`, so the
    /// store's on-disk footprint is isolated from sibling files at that
    /// path; [`Client::warehouse_path`] exposes the resulting location.
    /// A missing registry snapshot means a fresh store, not an error.
    ///
    /// The partition count is persisted on first open. A later open with
    /// a different `num_partitions` fails with a configuration error,
    /// because previously written keys would be routed to the wrong
    /// partition directories. `ignore_previous_data` bypasses the check
    /// and skips the registry load, rewriting the store metadata.
    ///
    /// # Errors
    ///
    /// `Config` for invalid parameters, `StoreLocked` if another client
    /// holds the warehouse, `Io`/`Codec` for filesystem or metadata
    /// failures other than absence.
    pub fn open(config: Config) -> StoreResult<Self> {
        config.validate()?;

        let root = config.sanitized_root();
        let dir = Arc::new(StoreDir::open(&root)?);

        let initial = if config.ignore_previous_data {
            dir.save_store_meta(&StoreMeta::new(config.num_partitions))?;
            HashMap::new()
        } else {
            match dir.load_store_meta()? {
                Some(meta) if meta.num_partitions != config.num_partitions => {
                    return Err(StoreError::config(format!(
                        "store was created with {} partitions, cannot open with {}",
                        meta.num_partitions, config.num_partitions
                    )));
                }
                Some(_) => {}
                None => dir.save_store_meta(&StoreMeta::new(config.num_partitions))?,
            }

            dir.load_registry()?.unwrap_or_default()
        };

        let registry = CollectionRegistry::new(Arc::clone(&dir), initial);

        Ok(Self {
            config,
            dir,
            registry,
            is_open: RwLock::new(true),
        })
    }

    /// Opens an existing store, taking the partition count from the
    /// persisted store metadata.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidFormat` if no store metadata exists at the
    /// root (nothing was ever written there).
    pub fn open_existing(document_root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = document_root.as_ref();

        let num_partitions = {
            let dir = StoreDir::open(root)?;
            let meta = dir.load_store_meta()?.ok_or_else(|| {
                StoreError::invalid_format(format!(
                    "no store metadata found under {}",
                    root.display()
                ))
            })?;
            meta.num_partitions
            // StoreDir (and the lock) drop here so open() can reacquire.
        };

        Self::open(Config::new(root, num_partitions))
    }

    // -------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the warehouse path (document root + warehouse
    /// subdirectory) where all store data lives.
    #[must_use]
    pub fn warehouse_path(&self) -> &Path {
        self.dir.warehouse_path()
    }

    /// Returns the sorted names of all registered collections.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.registry.names()
    }

    // -------------------------------------------------------------
    // Collection administration
    // -------------------------------------------------------------

    /// Creates and registers a new collection.
    pub fn add_collection(&self, name: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.registry.register(name)?;
        Ok(())
    }

    /// Removes a collection: unregisters it, persists the registry, and
    /// deletes its directory subtree.
    pub fn remove_collection(&self, name: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.registry.unregister(name)
    }

    /// Registers an index on a collection's field locator.
    ///
    /// Bookkeeping only: no index content is built or maintained.
    pub fn add_index(&self, collection: &str, field_locator: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.registry.add_index(collection, field_locator)
    }

    /// Returns the registered indexes of a collection.
    pub fn indexes(&self, collection: &str) -> StoreResult<HashMap<String, IndexInfo>> {
        self.ensure_open()?;
        Ok(self.registry.lookup(collection)?.indexes)
    }

    // -------------------------------------------------------------
    // Data writers
    // -------------------------------------------------------------

    /// Writes a raw byte payload under a key in a collection.
    pub fn set(&self, collection: &str, key: &str, data: &[u8]) -> StoreResult<()> {
        self.collection(collection)?.set(key, data)
    }

    /// Serializes a value and stores it under a key.
    pub fn set_value<T: serde::Serialize>(
        &self,
        collection: &str,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        self.collection(collection)?.set_value(key, value)
    }

    /// Streams bytes from a reader into a key's data file.
    pub fn set_from_reader<R: Read>(
        &self,
        collection: &str,
        key: &str,
        src: R,
    ) -> StoreResult<()> {
        self.collection(collection)?.set_from_reader(key, src)
    }

    // -------------------------------------------------------------
    // Data readers
    // -------------------------------------------------------------

    /// Reads the raw payload stored under a key.
    pub fn get(&self, collection: &str, key: &str) -> StoreResult<Vec<u8>> {
        self.collection(collection)?.get(key)
    }

    /// Reads the payload for a key, returning `None` when absent.
    pub fn get_if_exists(&self, collection: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.collection(collection)?.get_if_exists(key)
    }

    /// Decodes the value stored under a key.
    pub fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
    ) -> StoreResult<T> {
        self.collection(collection)?.get_value(key)
    }

    /// Decodes the value for a key, returning `None` when absent.
    pub fn get_value_if_exists<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
    ) -> StoreResult<Option<T>> {
        self.collection(collection)?.get_value_if_exists(key)
    }

    /// Opens the data file for a key and returns the handle.
    pub fn get_file(&self, collection: &str, key: &str) -> StoreResult<std::fs::File> {
        self.collection(collection)?.get_file(key)
    }

    /// Streams the payload for a key into a writer.
    pub fn get_into_writer<W: Write>(
        &self,
        collection: &str,
        key: &str,
        dest: W,
    ) -> StoreResult<()> {
        self.collection(collection)?.get_into_writer(key, dest)
    }

    // -------------------------------------------------------------
    // Search (reserved)
    // -------------------------------------------------------------

    /// Searches a collection with a field-indexed query.
    ///
    /// The entry point is hosted here so the registry's index metadata
    /// can back a future evaluator, but match semantics are deliberately
    /// unspecified: the call resolves the collection and then fails with
    /// `InvalidOperation`.
    pub fn search(&self, collection: &str, _query: &str) -> StoreResult<Vec<Vec<u8>>> {
        let _coll = self.collection(collection)?;
        Err(StoreError::invalid_operation(
            "search is not implemented; index registrations are metadata only",
        ))
    }

    // -------------------------------------------------------------
    // Destructive operations
    // -------------------------------------------------------------

    /// Deletes the entire warehouse tree.
    ///
    /// In-memory state is left alone: a client used after `flush_all`
    /// without reopening is in an undefined state, which is the caller's
    /// responsibility to avoid.
    pub fn flush_all(&self) -> StoreResult<()> {
        self.ensure_open()?;
        warn!(path = %self.dir.warehouse_path().display(), "deleting entire warehouse");
        self.dir.remove_warehouse()
    }

    /// Deletes the warehouse tree and resets this client in place: the
    /// registry is emptied and the open flag cleared. Every subsequent
    /// operation fails with `InvalidOperation` until a new client is
    /// opened.
    pub fn destroy(&self) -> StoreResult<()> {
        self.ensure_open()?;
        info!(path = %self.dir.warehouse_path().display(), "destroying store");

        self.dir.remove_warehouse()?;
        self.registry.clear();
        *self.is_open.write() = false;

        Ok(())
    }

    // -------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------

    /// Resolves a collection name to an owned handle.
    fn collection(&self, name: &str) -> StoreResult<Collection> {
        self.ensure_open()?;
        let meta: CollectionMeta = self.registry.lookup(name)?;
        Ok(Collection::new(meta, self.config.num_partitions))
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if *self.is_open.read() {
            Ok(())
        } else {
            Err(StoreError::invalid_operation(
                "store has been destroyed; open a new client",
            ))
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("warehouse", &self.dir.warehouse_path())
            .field("num_partitions", &self.config.num_partitions)
            .field("collections", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_client(root: &Path, partitions: u64) -> Client {
        Client::open(Config::new(root, partitions)).unwrap()
    }

    #[test]
    fn open_rejects_bad_config() {
        let temp = tempdir().unwrap();
        assert!(Client::open(Config::new(temp.path(), 0)).is_err());
        assert!(Client::open(Config::new(temp.path().join("missing"), 4)).is_err());
    }

    #[test]
    fn second_client_on_same_root_is_locked_out() {
        let temp = tempdir().unwrap();
        let _client = open_client(temp.path(), 4);

        let result = Client::open(Config::new(temp.path(), 4));
        assert!(matches!(result, Err(StoreError::StoreLocked)));
    }

    #[test]
    fn partition_count_mismatch_refused() {
        let temp = tempdir().unwrap();
        {
            let _client = open_client(temp.path(), 4);
        }

        let result = Client::open(Config::new(temp.path(), 8));
        assert!(matches!(result, Err(StoreError::Config { .. })));
    }

    #[test]
    fn ignore_previous_data_bypasses_mismatch() {
        let temp = tempdir().unwrap();
        {
            let _client = open_client(temp.path(), 4);
        }

        let client =
            Client::open(Config::new(temp.path(), 8).ignore_previous_data(true)).unwrap();
        assert_eq!(client.config().num_partitions, 8);
    }

    #[test]
    fn open_existing_reads_persisted_partition_count() {
        let temp = tempdir().unwrap();
        {
            let _client = open_client(temp.path(), 6);
        }

        let client = Client::open_existing(temp.path()).unwrap();
        assert_eq!(client.config().num_partitions, 6);
    }

    #[test]
    fn open_existing_fails_on_fresh_root() {
        let temp = tempdir().unwrap();
        let result = Client::open_existing(temp.path());
        assert!(matches!(result, Err(StoreError::InvalidFormat { .. })));
    }

    #[test]
    fn dispatch_to_missing_collection_fails() {
        let temp = tempdir().unwrap();
        let client = open_client(temp.path(), 4);

        assert!(matches!(
            client.set("ghost", "k", b"v"),
            Err(StoreError::CollectionNotFound { .. })
        ));
        assert!(matches!(
            client.get("ghost", "k"),
            Err(StoreError::CollectionNotFound { .. })
        ));
        assert!(matches!(
            client.search("ghost", "q"),
            Err(StoreError::CollectionNotFound { .. })
        ));
    }

    #[test]
    fn search_on_existing_collection_is_unsupported() {
        let temp = tempdir().unwrap();
        let client = open_client(temp.path(), 4);
        client.add_collection("users").unwrap();

        assert!(matches!(
            client.search("users", "age > 3"),
            Err(StoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn destroy_resets_in_place() {
        let temp = tempdir().unwrap();
        let client = open_client(temp.path(), 4);
        client.add_collection("users").unwrap();
        client.set("users", "u1", b"x").unwrap();

        client.destroy().unwrap();

        assert!(!client.warehouse_path().exists());
        assert!(matches!(
            client.get("users", "u1"),
            Err(StoreError::InvalidOperation { .. })
        ));
        assert!(matches!(
            client.add_collection("again"),
            Err(StoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn flush_all_removes_tree_only() {
        let temp = tempdir().unwrap();
        let client = open_client(temp.path(), 4);
        client.add_collection("users").unwrap();

        client.flush_all().unwrap();

        assert!(!client.warehouse_path().exists());
        // In-memory registry untouched by contract.
        assert_eq!(client.collection_names(), vec!["users"]);
    }
}
