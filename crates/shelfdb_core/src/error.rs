//! Error types for shelfdb core.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in shelfdb store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Codec error (encode or decode of structured values or metadata).
    #[error("codec error: {0}")]
    Codec(#[from] shelfdb_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid store configuration.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// Invalid collection or index properties.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Collection not found in the registry.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// A collection with the same name is already registered.
    #[error("collection already exists: {name}")]
    DuplicateCollection {
        /// Name of the collection.
        name: String,
    },

    /// An index for the same field locator is already registered.
    #[error("index already exists on collection {collection}: {field_locator}")]
    DuplicateIndex {
        /// The collection holding the index.
        collection: String,
        /// The duplicated field locator.
        field_locator: String,
    },

    /// Key has no document in the collection.
    #[error("key not found in collection {collection}: {key}")]
    KeyNotFound {
        /// The collection searched.
        collection: String,
        /// The key that was not found.
        key: String,
    },

    /// Another client holds the warehouse lock.
    #[error("store locked: another client has exclusive access")]
    StoreLocked,

    /// Invalid store metadata format or version.
    #[error("invalid store format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl StoreError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a collection-not-found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates a key-not-found error.
    pub fn key_not_found(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::KeyNotFound {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if this error is the key-not-found case that the
    /// `*_if_exists` accessors downgrade to a neutral result.
    #[must_use]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}
