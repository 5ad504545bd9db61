//! Warehouse directory management.
//!
//! This module owns the file system layout for a shelfdb store:
//!
//! ```text
//! <document_root>/shelfdb_warehouse/
//! ├─ LOCK                          # Advisory lock, one live client per root
//! ├─ meta/
//! │  ├─ store_meta                 # Format version + partition count
//! │  └─ registered_collections     # Full registry snapshot (CBOR)
//! └─ data/
//!    └─ <collection>/
//!       ├─ meta/
//!       │  └─ index/               # Reserved for per-index metadata
//!       └─ data/
//!          └─ partition_<bucket>/
//!             └─ <key>             # Raw bytes or codec-encoded value
//! ```
//!
//! Everything the store writes lives under the warehouse subdirectory, so
//! sibling files at `document_root` are never touched. Metadata files are
//! replaced with write-temp-then-rename followed by a directory fsync, so
//! a crash leaves either the previous or the new snapshot, never a
//! partial write.

use crate::collection::CollectionMeta;
use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Name of the warehouse subdirectory appended to the document root.
pub const WAREHOUSE_DIR: &str = "shelfdb_warehouse";
/// Name of the global and per-collection metadata directories.
pub const META_DIR: &str = "meta";
/// Name of the global and per-collection data directories.
pub const DATA_DIR: &str = "data";
/// Name of the reserved per-collection index metadata directory.
pub const INDEX_DIR: &str = "index";

const LOCK_FILE: &str = "LOCK";
const REGISTRY_FILE: &str = "registered_collections";
const REGISTRY_TEMP: &str = "registered_collections.tmp";
const STORE_META_FILE: &str = "store_meta";
const STORE_META_TEMP: &str = "store_meta.tmp";

/// Current store format version.
pub const FORMAT_VERSION: (u16, u16) = (1, 0);

/// Persisted store-wide metadata.
///
/// `num_partitions` is recorded here so that reopening a store with a
/// different partition count can be refused instead of silently
/// misrouting lookups for previously written keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    /// Format version (major, minor).
    pub format_version: (u16, u16),
    /// Partition count the store was created with.
    pub num_partitions: u64,
}

impl StoreMeta {
    /// Creates store metadata for the current format version.
    #[must_use]
    pub fn new(num_partitions: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            num_partitions,
        }
    }
}

/// Manages the warehouse directory structure and file locking.
///
/// # Thread Safety
///
/// The `StoreDir` holds an exclusive advisory lock on the warehouse.
/// Only one `StoreDir` instance can exist per document root at a time;
/// the lock is released when the value is dropped.
#[derive(Debug)]
pub struct StoreDir {
    /// Warehouse root (document root + warehouse subdirectory).
    warehouse: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl StoreDir {
    /// Opens or creates the warehouse under the given document root.
    ///
    /// The document root itself must already exist (validated by
    /// [`Config::validate`](crate::Config::validate)); the warehouse
    /// subtree is created here if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreLocked` if another client holds the lock, or an
    /// I/O error if directory creation fails.
    pub fn open(document_root: &Path) -> StoreResult<Self> {
        let warehouse = document_root.join(WAREHOUSE_DIR);

        fs::create_dir_all(warehouse.join(META_DIR))?;
        fs::create_dir_all(warehouse.join(DATA_DIR))?;

        let lock_path = warehouse.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::StoreLocked);
        }

        Ok(Self {
            warehouse,
            _lock_file: lock_file,
        })
    }

    /// Returns the warehouse root path.
    #[must_use]
    pub fn warehouse_path(&self) -> &Path {
        &self.warehouse
    }

    /// Returns the global metadata directory.
    #[must_use]
    pub fn meta_dir(&self) -> PathBuf {
        self.warehouse.join(META_DIR)
    }

    /// Returns the directory holding all collection subtrees.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.warehouse.join(DATA_DIR)
    }

    /// Returns the root directory for a named collection.
    ///
    /// The path is a pure function of the warehouse root and the name;
    /// it never changes after the collection is created.
    #[must_use]
    pub fn collection_dir(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    /// Returns the path of the persisted registry snapshot.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.meta_dir().join(REGISTRY_FILE)
    }

    /// Returns the path of the persisted store metadata.
    #[must_use]
    pub fn store_meta_path(&self) -> PathBuf {
        self.meta_dir().join(STORE_META_FILE)
    }

    /// Loads the registry snapshot from disk.
    ///
    /// Returns `None` if no snapshot exists yet (fresh store).
    pub fn load_registry(&self) -> StoreResult<Option<HashMap<String, CollectionMeta>>> {
        let path = self.registry_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        if data.is_empty() {
            return Ok(None);
        }

        let registry = shelfdb_codec::decode(&data)?;
        Ok(Some(registry))
    }

    /// Persists the full registry snapshot atomically.
    ///
    /// Write-then-rename pattern for crash safety:
    /// 1. Encode and write to a temporary file
    /// 2. Sync the temporary file to disk
    /// 3. Rename over the registry file
    /// 4. Fsync the metadata directory
    pub fn save_registry(&self, registry: &HashMap<String, CollectionMeta>) -> StoreResult<()> {
        let data = shelfdb_codec::encode(registry)?;
        self.replace_meta_file(REGISTRY_TEMP, REGISTRY_FILE, &data)
    }

    /// Loads the store metadata, if present.
    pub fn load_store_meta(&self) -> StoreResult<Option<StoreMeta>> {
        let path = self.store_meta_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        if data.is_empty() {
            return Ok(None);
        }

        let meta: StoreMeta = shelfdb_codec::decode(&data)?;
        if meta.format_version.0 != FORMAT_VERSION.0 {
            return Err(StoreError::invalid_format(format!(
                "incompatible store format: store is v{}.{}, expected v{}.{}",
                meta.format_version.0,
                meta.format_version.1,
                FORMAT_VERSION.0,
                FORMAT_VERSION.1
            )));
        }
        Ok(Some(meta))
    }

    /// Persists the store metadata atomically.
    pub fn save_store_meta(&self, meta: &StoreMeta) -> StoreResult<()> {
        let data = shelfdb_codec::encode(meta)?;
        self.replace_meta_file(STORE_META_TEMP, STORE_META_FILE, &data)
    }

    /// Creates the directory subtree for a new collection:
    /// `meta/`, `meta/index/` and `data/`.
    ///
    /// Directories already created before a failing step are not rolled
    /// back; they are orphaned but harmless until a registry entry
    /// references them.
    pub fn create_collection_dirs(&self, name: &str) -> StoreResult<PathBuf> {
        let dir = self.collection_dir(name);

        fs::create_dir_all(dir.join(META_DIR))?;
        fs::create_dir_all(dir.join(META_DIR).join(INDEX_DIR))?;
        fs::create_dir_all(dir.join(DATA_DIR))?;

        Ok(dir)
    }

    /// Deletes a collection's entire directory subtree.
    pub fn remove_collection_dirs(&self, name: &str) -> StoreResult<()> {
        let dir = self.collection_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            self.sync_dir(&self.data_dir())?;
        }
        Ok(())
    }

    /// Deletes the entire warehouse subtree.
    ///
    /// The held lock file goes with it; the caller is expected to drop
    /// or reopen the store afterwards.
    pub fn remove_warehouse(&self) -> StoreResult<()> {
        if self.warehouse.exists() {
            fs::remove_dir_all(&self.warehouse)?;
        }
        Ok(())
    }

    fn replace_meta_file(&self, temp_name: &str, final_name: &str, data: &[u8]) -> StoreResult<()> {
        use std::io::Write;

        let meta_dir = self.meta_dir();
        let temp_path = meta_dir.join(temp_name);
        let final_path = meta_dir.join(final_name);

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &final_path)?;
        self.sync_dir(&meta_dir)?;

        Ok(())
    }

    /// Fsyncs a directory so renames and deletions are durable.
    ///
    /// On Windows the NTFS journal covers metadata durability and
    /// directory fsync is not supported, so this is a no-op there.
    #[cfg(unix)]
    fn sync_dir(&self, path: &Path) -> StoreResult<()> {
        let dir = File::open(path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(&self, _path: &Path) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_warehouse_layout() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path()).unwrap();

        assert!(dir.meta_dir().is_dir());
        assert!(dir.data_dir().is_dir());
        assert_eq!(dir.warehouse_path(), temp.path().join(WAREHOUSE_DIR));
    }

    #[test]
    fn lock_prevents_second_open() {
        let temp = tempdir().unwrap();
        let _dir1 = StoreDir::open(temp.path()).unwrap();

        let result = StoreDir::open(temp.path());
        assert!(matches!(result, Err(StoreError::StoreLocked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        {
            let _dir = StoreDir::open(temp.path()).unwrap();
        }
        let _dir2 = StoreDir::open(temp.path()).unwrap();
    }

    #[test]
    fn registry_round_trip() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path()).unwrap();

        assert!(dir.load_registry().unwrap().is_none());

        let mut registry = HashMap::new();
        registry.insert(
            "users".to_string(),
            CollectionMeta::new("users", dir.collection_dir("users")),
        );
        dir.save_registry(&registry).unwrap();

        let loaded = dir.load_registry().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["users"].name, "users");
        assert_eq!(loaded["users"].dir_path, dir.collection_dir("users"));
    }

    #[test]
    fn store_meta_round_trip() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path()).unwrap();

        assert!(dir.load_store_meta().unwrap().is_none());

        dir.save_store_meta(&StoreMeta::new(8)).unwrap();

        let loaded = dir.load_store_meta().unwrap().unwrap();
        assert_eq!(loaded.num_partitions, 8);
        assert_eq!(loaded.format_version, FORMAT_VERSION);
    }

    #[test]
    fn collection_dirs_created_and_removed() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path()).unwrap();

        let coll = dir.create_collection_dirs("users").unwrap();
        assert!(coll.join(META_DIR).is_dir());
        assert!(coll.join(META_DIR).join(INDEX_DIR).is_dir());
        assert!(coll.join(DATA_DIR).is_dir());

        dir.remove_collection_dirs("users").unwrap();
        assert!(!coll.exists());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path()).unwrap();

        dir.save_registry(&HashMap::new()).unwrap();
        assert!(dir.registry_path().exists());
        assert!(!dir.meta_dir().join(REGISTRY_TEMP).exists());
    }
}
