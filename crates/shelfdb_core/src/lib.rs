//! # shelfdb Core
//!
//! An embeddable document storage engine that persists byte payloads
//! and serializable structures to the local filesystem, grouped into
//! named collections. Each collection shards its data files across a
//! fixed number of hash-selected partition directories so per-directory
//! file counts stay bounded.
//!
//! This crate provides:
//! - The [`Client`] facade: configuration, one-time initialization and
//!   the full CRUD/administration surface
//! - The collection registry with single-snapshot metadata persistence
//! - Keyed get/set in raw-byte, structured-value and streaming forms
//! - Deterministic key → partition routing
//!
//! There is no network protocol, no transaction log and no query
//! planner: shelfdb is a local, process-embedded storage layer for
//! applications that need simple keyed persistence with
//! metadata-driven index registration.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod collection;
pub mod config;
pub mod dir;
pub mod error;
pub mod partition;
pub mod registry;

pub use client::Client;
pub use collection::{Collection, CollectionMeta, IndexInfo};
pub use config::Config;
pub use dir::{StoreMeta, FORMAT_VERSION, WAREHOUSE_DIR};
pub use error::{StoreError, StoreResult};

/// Current version of shelfdb core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
