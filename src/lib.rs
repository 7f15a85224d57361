//! clientdb - embedded JSON document store for subscription client records
//!
//! clientdb keeps each collection (`clients`, `messages`, `sessions`, `logs`,
//! `settings`) as one JSON file in a data directory. Every operation reloads
//! the file, so the file is always the source of truth. Writes are atomic
//! (temp file, fsync, rename) and serialized per collection.
//!
//! # Quick Start
//!
//! ```ignore
//! use clientdb::{ClientRecord, Database, Filter, Query, SortOrder, StoreConfig};
//!
//! let db = Database::open(StoreConfig::in_dir("/var/lib/panel"))?;
//! let clients = db.clients();
//!
//! let ana = clients.create(ClientRecord::new("Ana", "+5491100000000", "Netflix", "2025-01-31"))?;
//! clients.update(ana.id.unwrap(), &serde_json::json!({"notes": "pays cash"}))?;
//!
//! let page = clients.find_page(
//!     &Query::filtered(Filter::new().eq("status", "active"))
//!         .sort_by("name", SortOrder::Ascending)
//!         .page(1, 20),
//! );
//!
//! db.backup()?;
//! let health = db.check_health();
//! ```
//!
//! # Architecture
//!
//! | Crate | Role |
//! |-------|------|
//! | `clientdb-core` | records, collections, errors |
//! | `clientdb-storage` | atomic file codec, directory layout |
//! | `clientdb-durability` | backups, retention, health checks |
//! | `clientdb-engine` | stores, queries, configuration, `Database` |

pub use clientdb_core::{
    format_timestamp, parse_date, ClientRecord, ClientStatus, Collection, CollectionShape,
    Document, Record, RecordId, Result, StoreError,
};
pub use clientdb_durability::{
    BackupEntry, BackupManager, BackupReport, CleanupReport, DiskSpaceProbe, FileBackupResult,
    FileBackupStatus, FileStats, HealthMonitor, HealthReport, HealthStatus, HealthThresholds,
};
pub use clientdb_engine::{
    ClientStore, Database, DocumentStore, Filter, OrSemantics, PageRequest, PageResult, Pattern,
    Predicate, Query, SettingsStore, Sort, SortOrder, StoreConfig, CONFIG_FILE_NAME,
};
pub use clientdb_storage::{DataPaths, FileCodec, StagedWrite};

/// Crash and corruption helpers for exercising the storage layer in tests
pub mod testing {
    pub use clientdb_storage::testing::*;
}
