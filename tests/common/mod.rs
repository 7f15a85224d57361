//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, SystemTime};

pub use chrono::{Duration as ChronoDuration, Local, NaiveDate};
pub use clientdb::{
    ClientRecord, ClientStatus, Collection, Database, Document, Filter, OrSemantics, Query,
    Record, SortOrder, StoreConfig, StoreError,
};
pub use serde_json::{json, Value};
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route store logs through the test harness writer (shown on failure)
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

// ============================================================================
// TestStore - database in a temporary directory
// ============================================================================

/// Database wrapper that owns its temporary directory
pub struct TestStore {
    pub db: Database,
    pub dir: TempDir,
}

impl TestStore {
    /// Open a store with default settings (fsync disabled for speed)
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Open a store with fsync on every write
    pub fn new_synced() -> Self {
        Self::with_config(|config| config.with_sync_writes(true))
    }

    /// Open a store after adjusting the default test config
    pub fn with_config(adjust: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = adjust(StoreConfig::in_dir(dir.path()).with_sync_writes(false));
        let db = Database::open(config).expect("Failed to open test store");
        TestStore { db, dir }
    }

    /// Reopen the store over the same directory (simulates restart)
    pub fn reopen(&mut self) {
        let config = self.db.config().clone();
        self.db = Database::open(config).expect("Failed to reopen test store");
    }

    /// Path of a collection file
    pub fn file(&self, collection: Collection) -> PathBuf {
        self.db.paths().collection(collection)
    }

    pub fn data_dir(&self) -> &Path {
        self.db.paths().data_dir()
    }

    pub fn backup_dir(&self) -> &Path {
        self.db.paths().backup_dir()
    }

    /// Replace the clients file with exactly `clients` (skips seeding)
    pub fn with_clients(self, clients: &[ClientRecord]) -> Self {
        let text = serde_json::to_string_pretty(clients).expect("serialize clients");
        std::fs::write(self.file(Collection::Clients), text).expect("write clients file");
        self
    }

    /// Start from an empty clients collection
    pub fn empty_clients(self) -> Self {
        self.with_clients(&[])
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Data helpers
// ============================================================================

/// Client with a unique phone derived from `n`
pub fn client(n: usize, name: &str) -> ClientRecord {
    ClientRecord::new(
        name,
        format!("+54911{:08}", n),
        "Netflix",
        "2030-01-01",
    )
}

/// `YYYY-MM-DD` for `today + offset_days`
pub fn date_from(today: NaiveDate, offset_days: i64) -> String {
    (today + ChronoDuration::days(offset_days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Read a collection file as raw JSON
pub fn read_json(path: &Path) -> Value {
    let bytes = std::fs::read(path).expect("read collection file");
    serde_json::from_slice(&bytes).expect("collection file is valid JSON")
}

/// Set a directory's (or file's) modification time to `days` days ago
pub fn age_by_days(path: &Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    let file = std::fs::File::open(path).expect("open for set_modified");
    file.set_modified(when).expect("set_modified");
}

/// Names of the entries in a directory, sorted
pub fn dir_entries(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(path)
        .expect("read_dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
