//! Collection registry: the authoritative name → collection mapping.
//!
//! The registry is the single source of truth for which collections
//! exist. Every registration change re-persists the entire mapping as
//! one snapshot file while the write lock is still held, keeping the
//! in-memory map and the on-disk snapshot consistent. Lookups clone the
//! matched metadata out, so no caller ever holds a reference into the
//! guarded map.

use crate::collection::CollectionMeta;
use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Concurrency-guarded mapping from collection name to metadata, backed
/// by a single persisted snapshot file.
#[derive(Debug)]
pub struct CollectionRegistry {
    dir: Arc<StoreDir>,
    inner: RwLock<HashMap<String, CollectionMeta>>,
}

impl CollectionRegistry {
    /// Creates a registry over an initial mapping (loaded from disk, or
    /// empty for a fresh store).
    pub fn new(dir: Arc<StoreDir>, initial: HashMap<String, CollectionMeta>) -> Self {
        Self {
            dir,
            inner: RwLock::new(initial),
        }
    }

    /// Looks up a collection by name, returning a clone of its metadata.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if the name is not registered.
    pub fn lookup(&self, name: &str) -> StoreResult<CollectionMeta> {
        self.inner
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::collection_not_found(name))
    }

    /// Returns the names of all registered collections, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registers a new collection.
    ///
    /// Validates the name, rejects duplicates, creates the collection's
    /// directory subtree, then inserts and persists the full snapshot
    /// under the write lock. If directory creation fails the map is left
    /// unchanged; directories already created are not rolled back.
    pub fn register(&self, name: &str) -> StoreResult<CollectionMeta> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("empty collection name provided"));
        }

        // Cheap duplicate check before touching the filesystem. The
        // authoritative check happens again under the write lock.
        if self.inner.read().contains_key(name) {
            return Err(StoreError::DuplicateCollection {
                name: name.to_string(),
            });
        }

        let dir_path = self.dir.create_collection_dirs(name)?;
        let meta = CollectionMeta::new(name, dir_path);

        let mut map = self.inner.write();
        if map.contains_key(name) {
            return Err(StoreError::DuplicateCollection {
                name: name.to_string(),
            });
        }
        map.insert(name.to_string(), meta.clone());
        self.dir.save_registry(&map)?;
        drop(map);

        debug!(collection = name, "registered collection");
        Ok(meta)
    }

    /// Unregisters a collection and deletes its directory subtree.
    ///
    /// The updated snapshot is persisted before the files are deleted: a
    /// crash between the two steps can orphan a directory, which is
    /// harmless, whereas the reverse order could leave a registry entry
    /// pointing at deleted data.
    pub fn unregister(&self, name: &str) -> StoreResult<()> {
        let mut map = self.inner.write();
        let meta = map
            .remove(name)
            .ok_or_else(|| StoreError::collection_not_found(name))?;

        info!(collection = name, "removing collection registration");
        self.dir.save_registry(&map)?;
        drop(map);

        info!(path = %meta.dir_path.display(), "deleting collection data");
        self.dir.remove_collection_dirs(name)?;

        Ok(())
    }

    /// Registers an index on a collection and persists the snapshot.
    pub fn add_index(&self, name: &str, field_locator: &str) -> StoreResult<()> {
        let mut map = self.inner.write();
        let meta = map
            .get_mut(name)
            .ok_or_else(|| StoreError::collection_not_found(name))?;

        meta.add_index(field_locator)?;
        self.dir.save_registry(&map)?;

        debug!(collection = name, field_locator, "registered index");
        Ok(())
    }

    /// Number of registered collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no collections are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Clears the in-memory mapping without touching disk.
    ///
    /// Used by `destroy`, which removes the whole warehouse tree anyway.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, CollectionRegistry) {
        let temp = tempdir().unwrap();
        let dir = Arc::new(StoreDir::open(temp.path()).unwrap());
        let registry = CollectionRegistry::new(dir, HashMap::new());
        (temp, registry)
    }

    #[test]
    fn register_and_lookup() {
        let (_temp, registry) = setup();

        let meta = registry.register("users").unwrap();
        assert_eq!(meta.name, "users");
        assert!(meta.dir_path.is_dir());

        let found = registry.lookup("users").unwrap();
        assert_eq!(found, meta);
    }

    #[test]
    fn lookup_unknown_fails() {
        let (_temp, registry) = setup();
        assert!(matches!(
            registry.lookup("ghost"),
            Err(StoreError::CollectionNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_name_rejected() {
        let (_temp, registry) = setup();
        registry.register("users").unwrap();

        let err = registry.register("users").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCollection { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_name_rejected() {
        let (_temp, registry) = setup();
        assert!(matches!(
            registry.register("  "),
            Err(StoreError::Validation { .. })
        ));
    }

    #[test]
    fn unregister_removes_entry_and_files() {
        let (_temp, registry) = setup();
        let meta = registry.register("users").unwrap();
        assert!(meta.dir_path.exists());

        registry.unregister("users").unwrap();

        assert!(registry.lookup("users").is_err());
        assert!(!meta.dir_path.exists());
    }

    #[test]
    fn unregister_unknown_fails() {
        let (_temp, registry) = setup();
        assert!(matches!(
            registry.unregister("ghost"),
            Err(StoreError::CollectionNotFound { .. })
        ));
    }

    #[test]
    fn registry_snapshot_survives_reload() {
        let temp = tempdir().unwrap();
        {
            let dir = Arc::new(StoreDir::open(temp.path()).unwrap());
            let registry = CollectionRegistry::new(Arc::clone(&dir), HashMap::new());
            registry.register("users").unwrap();
            registry.register("posts").unwrap();
            registry.add_index("users", "profile.age").unwrap();
        }

        let dir = Arc::new(StoreDir::open(temp.path()).unwrap());
        let loaded = dir.load_registry().unwrap().unwrap();
        let registry = CollectionRegistry::new(dir, loaded);

        assert_eq!(registry.names(), vec!["posts", "users"]);
        let users = registry.lookup("users").unwrap();
        assert!(users.indexes.contains_key("profile.age"));
    }

    #[test]
    fn add_index_duplicate_rejected() {
        let (_temp, registry) = setup();
        registry.register("users").unwrap();

        registry.add_index("users", "name").unwrap();
        let err = registry.add_index("users", "name").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIndex { .. }));
    }

    #[test]
    fn add_index_unknown_collection_fails() {
        let (_temp, registry) = setup();
        assert!(matches!(
            registry.add_index("ghost", "name"),
            Err(StoreError::CollectionNotFound { .. })
        ));
    }

    #[test]
    fn lookup_returns_a_copy() {
        let (_temp, registry) = setup();
        registry.register("users").unwrap();

        let mut copy = registry.lookup("users").unwrap();
        copy.add_index("local.only").unwrap();

        // Mutating the copy must not leak into the registry.
        assert!(registry.lookup("users").unwrap().indexes.is_empty());
    }
}
