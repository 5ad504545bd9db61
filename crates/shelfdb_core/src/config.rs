//! Store configuration.

use crate::error::{StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Configuration for opening a store.
///
/// `document_root` must name an existing directory; the store keeps its
/// entire on-disk footprint inside a `shelfdb_warehouse` subdirectory of
/// it, so sibling files at the root are never touched.
///
/// `num_partitions` is fixed for the lifetime of the store. It is
/// persisted on first open and later opens must match it (see
/// [`Client::open`](crate::Client::open)).
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute path to the directory used for storing data.
    pub document_root: PathBuf,

    /// How many partition subdirectories each collection shards its
    /// data files across.
    pub num_partitions: u64,

    /// Skip previously persisted metadata on open and rewrite the store
    /// metadata file. Existing data files are left in place.
    pub ignore_previous_data: bool,

    /// Reserved toggle for the transparent compression layer. Core
    /// carries the flag but does not act on it.
    pub enable_gzip: bool,
}

impl Config {
    /// Creates a configuration for the given root with default settings.
    #[must_use]
    pub fn new(document_root: impl Into<PathBuf>, num_partitions: u64) -> Self {
        Self {
            document_root: document_root.into(),
            num_partitions,
            ignore_previous_data: false,
            enable_gzip: false,
        }
    }

    /// Sets whether to ignore previously persisted metadata.
    #[must_use]
    pub const fn ignore_previous_data(mut self, value: bool) -> Self {
        self.ignore_previous_data = value;
        self
    }

    /// Sets the compression toggle.
    #[must_use]
    pub const fn enable_gzip(mut self, value: bool) -> Self {
        self.enable_gzip = value;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` errors if the root is blank, missing, or not a
    /// directory, or if `num_partitions` is zero.
    pub fn validate(&self) -> StoreResult<()> {
        let root = self.document_root.as_os_str();
        if root.is_empty() || root.to_string_lossy().trim().is_empty() {
            return Err(StoreError::config("empty document_root provided"));
        }

        if self.num_partitions < 1 {
            return Err(StoreError::config(format!(
                "invalid num_partitions value provided: {}",
                self.num_partitions
            )));
        }

        if !self.document_root.exists() {
            return Err(StoreError::config(format!(
                "no directory found at path {}",
                self.document_root.display()
            )));
        }
        if !self.document_root.is_dir() {
            return Err(StoreError::config(format!(
                "{} is not a directory",
                self.document_root.display()
            )));
        }

        Ok(())
    }

    /// Returns the document root with trailing path separators stripped.
    ///
    /// `PathBuf` normalizes most of this already; the explicit strip
    /// keeps warehouse paths identical however the caller spelled the
    /// root.
    #[must_use]
    pub fn sanitized_root(&self) -> PathBuf {
        let mut s = self.document_root.to_string_lossy().into_owned();
        while s.len() > 1 && s.ends_with(std::path::MAIN_SEPARATOR) {
            s.pop();
        }
        PathBuf::from(s)
    }
}

impl AsRef<Path> for Config {
    fn as_ref(&self) -> &Path {
        &self.document_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::new(temp.path(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_root_rejected() {
        let config = Config::new("", 4);
        assert!(matches!(
            config.validate(),
            Err(StoreError::Config { .. })
        ));
    }

    #[test]
    fn zero_partitions_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::new(temp.path(), 0);
        assert!(matches!(
            config.validate(),
            Err(StoreError::Config { .. })
        ));
    }

    #[test]
    fn missing_root_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::new(temp.path().join("nope"), 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_root_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let file_path = temp.path().join("a_file");
        std::fs::write(&file_path, b"x").unwrap();

        let config = Config::new(&file_path, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn trailing_separator_stripped() {
        let config = Config::new(format!("/tmp/store{}", std::path::MAIN_SEPARATOR), 4);
        assert_eq!(config.sanitized_root(), PathBuf::from("/tmp/store"));
    }

    #[test]
    fn builder_flags() {
        let config = Config::new("/tmp", 8)
            .ignore_previous_data(true)
            .enable_gzip(true);
        assert!(config.ignore_previous_data);
        assert!(config.enable_gzip);
    }
}
