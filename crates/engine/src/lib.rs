//! Store engine for clientdb
//!
//! This crate ties the lower layers together:
//! - Database: open logic, per-collection store handles, backup and health
//! - DocumentStore / SettingsStore: load-modify-save collection operations
//! - Query: filter, sort and paginate over in-memory record sets
//! - StoreConfig: `clientdb.toml`
//!
//! The engine is the only component that knows about:
//! - Which collections exist and how they are seeded
//! - Per-collection write serialization
//! - Read-path degradation on corrupt files

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod query;
pub mod store;

pub use database::{Database, StoreConfig, WriteLock, WriteLocks, CONFIG_FILE_NAME};
pub use query::{
    Filter, OrSemantics, PageRequest, PageResult, Pattern, Predicate, Query, Sort, SortOrder,
    OR_KEY,
};
pub use store::{sample_clients, ClientStore, DocumentStore, SettingsStore};
