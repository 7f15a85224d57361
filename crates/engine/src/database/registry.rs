//! Per-collection write lock registry
//!
//! Every mutation runs load, modify, save against the collection file.
//! Two of those cycles overlapping on one file lose a write, so each
//! collection gets one mutex and every store handle for that collection
//! shares it. Reads never take the lock.
//!
//! Lock sets are shared per data directory: every `Database` opened on the
//! same canonical path gets the same `WriteLocks`. The process-wide map holds
//! weak references, so a directory's locks go away with its last `Database`.
//!
//! Uses parking_lot::Mutex so a panicking writer does not poison the
//! collection for everyone else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use clientdb_core::Collection;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Canonical data directory -> lock set of the databases open on it
static OPEN_DIRECTORIES: Lazy<Mutex<HashMap<PathBuf, Weak<WriteLocks>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Lock guarding one collection's mutations
pub type WriteLock = Arc<Mutex<()>>;

/// Collection name -> write lock
#[derive(Debug, Default)]
pub struct WriteLocks {
    locks: DashMap<Collection, WriteLock>,
}

impl WriteLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        WriteLocks::default()
    }

    /// Lock set shared by every database open on `data_dir`
    ///
    /// `data_dir` must already be canonical.
    pub fn for_data_dir(data_dir: &Path) -> Arc<WriteLocks> {
        let mut registry = OPEN_DIRECTORIES.lock();
        if let Some(locks) = registry.get(data_dir).and_then(Weak::upgrade) {
            return locks;
        }

        registry.retain(|_, locks| locks.strong_count() > 0);
        let locks = Arc::new(WriteLocks::new());
        registry.insert(data_dir.to_path_buf(), Arc::downgrade(&locks));
        locks
    }

    /// Lock for `collection`, created on first request
    pub fn get(&self, collection: Collection) -> WriteLock {
        self.locks
            .entry(collection)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of collections that have a lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// True when no lock has been handed out yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
