//! Collections: identity metadata and keyed document access.
//!
//! A collection's identity (name, directory path, index registrations)
//! is plain, clonable data in [`CollectionMeta`]. The [`Collection`]
//! handle a registry lookup returns is built from a clone of that
//! metadata plus the store's partition count — it carries no lock and no
//! shared mutable state, so handles can be freely moved across threads
//! while the registry mutates underneath them.

use crate::dir::DATA_DIR;
use crate::error::{StoreError, StoreResult};
use crate::partition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique temp file names within this process.
static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(1);

/// Descriptor of one registered index.
///
/// Registration is bookkeeping only: it declares a field locator as
/// indexed so a future query evaluator can enumerate indexed fields.
/// Index content is neither built nor maintained here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Dotted path of the indexed field within stored documents.
    pub field_locator: String,
}

impl IndexInfo {
    /// Creates an index descriptor for a field locator.
    #[must_use]
    pub fn new(field_locator: impl Into<String>) -> Self {
        Self {
            field_locator: field_locator.into(),
        }
    }
}

/// Persisted, clonable identity of a collection.
///
/// Name and directory path are fixed at creation; only the index
/// registrations change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMeta {
    /// Unique collection name within the store.
    pub name: String,
    /// Root directory of the collection subtree.
    pub dir_path: PathBuf,
    /// Registered indexes, keyed by field locator.
    pub indexes: HashMap<String, IndexInfo>,
}

impl CollectionMeta {
    /// Creates metadata for a new collection with no indexes.
    #[must_use]
    pub fn new(name: impl Into<String>, dir_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir_path: dir_path.into(),
            indexes: HashMap::new(),
        }
    }

    /// Registers an index on a field locator.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the locator is empty and `DuplicateIndex`
    /// if the locator is already registered.
    pub fn add_index(&mut self, field_locator: &str) -> StoreResult<()> {
        if field_locator.trim().is_empty() {
            return Err(StoreError::validation("empty field locator provided"));
        }
        if self.indexes.contains_key(field_locator) {
            return Err(StoreError::DuplicateIndex {
                collection: self.name.clone(),
                field_locator: field_locator.to_string(),
            });
        }

        self.indexes
            .insert(field_locator.to_string(), IndexInfo::new(field_locator));
        Ok(())
    }
}

/// A handle for keyed reads and writes against one collection.
///
/// Obtained from the client, which resolves the name against the
/// registry and snapshots the collection metadata. The handle stays
/// valid for file I/O even if the collection is concurrently removed;
/// operations then fail with ordinary I/O or not-found errors.
#[derive(Debug, Clone)]
pub struct Collection {
    meta: CollectionMeta,
    num_partitions: u64,
}

impl Collection {
    /// Builds a handle from collection metadata and the store's
    /// partition count.
    #[must_use]
    pub fn new(meta: CollectionMeta, num_partitions: u64) -> Self {
        Self {
            meta,
            num_partitions,
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Returns the collection's root directory.
    #[must_use]
    pub fn dir_path(&self) -> &Path {
        &self.meta.dir_path
    }

    /// Returns the registered indexes, keyed by field locator.
    #[must_use]
    pub fn indexes(&self) -> &HashMap<String, IndexInfo> {
        &self.meta.indexes
    }

    /// Returns the data file path for a key.
    ///
    /// Deterministic: the same key always resolves to the same partition
    /// directory for a fixed partition count.
    #[must_use]
    pub fn file_path(&self, key: &str) -> PathBuf {
        self.meta
            .dir_path
            .join(DATA_DIR)
            .join(partition::partition_dir_name(key, self.num_partitions))
            .join(key)
    }

    // -------------------------------------------------------------
    // Writers
    // -------------------------------------------------------------

    /// Writes a raw byte payload for a key, replacing any prior value.
    ///
    /// The payload goes to a temporary file first and is renamed into
    /// place, so concurrent readers never observe a partially written
    /// document. Last write wins.
    pub fn set(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.write_via_temp(key, |file| Ok(file.write_all(data)?))
    }

    /// Serializes a value with the codec and stores it under a key.
    pub fn set_value<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let data = shelfdb_codec::encode(value)?;
        self.set(key, &data)
    }

    /// Streams bytes from a reader into a key's data file without
    /// buffering the whole payload in memory.
    pub fn set_from_reader<R: Read>(&self, key: &str, mut src: R) -> StoreResult<()> {
        self.write_via_temp(key, |file| {
            std::io::copy(&mut src, file)?;
            Ok(())
        })
    }

    // -------------------------------------------------------------
    // Readers
    // -------------------------------------------------------------

    /// Reads the raw byte payload stored under a key.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if no document exists for the key.
    pub fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.validate_key(key)?;
        fs::read(self.file_path(key)).map_err(|e| self.map_not_found(key, e))
    }

    /// Reads the payload for a key, returning `None` when absent.
    ///
    /// Only the not-found case is downgraded; every other error
    /// propagates unchanged.
    pub fn get_if_exists(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.get(key) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.is_key_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Decodes the value stored under a key.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent; `Codec` if the stored bytes are not
    /// valid for the requested type.
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> StoreResult<T> {
        let data = self.get(key)?;
        Ok(shelfdb_codec::decode(&data)?)
    }

    /// Decodes the value for a key, returning `None` when absent.
    pub fn get_value_if_exists<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_value(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_key_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Opens the data file for a key and returns the handle.
    pub fn get_file(&self, key: &str) -> StoreResult<File> {
        self.validate_key(key)?;
        File::open(self.file_path(key)).map_err(|e| self.map_not_found(key, e))
    }

    /// Streams the payload for a key into a writer.
    pub fn get_into_writer<W: Write>(&self, key: &str, mut dest: W) -> StoreResult<()> {
        let mut file = self.get_file(key)?;
        std::io::copy(&mut file, &mut dest)?;
        Ok(())
    }

    // -------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------

    fn validate_key(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::validation("empty key provided"));
        }
        Ok(())
    }

    /// Writes a document through a temp file in the key's partition
    /// directory, then renames it over the final path. Creates the
    /// partition directory lazily.
    fn write_via_temp<F>(&self, key: &str, fill: F) -> StoreResult<()>
    where
        F: FnOnce(&mut File) -> StoreResult<()>,
    {
        self.validate_key(key)?;

        let final_path = self.file_path(key);
        let partition_dir = final_path
            .parent()
            .ok_or_else(|| StoreError::validation(format!("invalid key: {key}")))?
            .to_path_buf();
        fs::create_dir_all(&partition_dir)?;

        let temp_id = NEXT_TEMP_ID.fetch_add(1, Ordering::SeqCst);
        let temp_path = partition_dir.join(format!(".shelf-tmp-{temp_id}"));

        let mut file = File::create(&temp_path)?;
        if let Err(e) = fill(&mut file) {
            drop(file);
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        drop(file);

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    fn map_not_found(&self, key: &str, err: std::io::Error) -> StoreError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::key_not_found(&self.meta.name, key)
        } else {
            StoreError::Io(err)
        }
    }
}
