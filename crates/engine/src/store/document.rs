//! Document store: one collection file, full reload per operation
//!
//! The file is the source of truth. No state is cached between calls:
//! every read loads the file, every mutation loads it, changes it and saves
//! it back through the atomic codec.
//!
//! ## Concurrency
//!
//! Mutations (`create`, `update`, `delete`) hold the collection's write
//! lock for the whole load-modify-save cycle, so two concurrent updates to
//! the same record both land. Reads do not lock and may observe the state
//! from just before an in-flight mutation.
//!
//! ## Failure behaviour
//!
//! | Situation | Reads | Mutations |
//! |-----------|-------|-----------|
//! | file missing | seed, then read | seed, then mutate |
//! | file corrupt | log, return empty | `Err(Corrupt)`, file untouched |
//! | save fails | n/a | `Err(Io)` |

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clientdb_core::{
    generate_id, parse_date, timestamp_now, Collection, Record, RecordId, Result, StoreError,
    CREATED_AT_FIELD, ID_FIELD,
};
use clientdb_storage::FileCodec;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::database::WriteLock;
use crate::query::{Filter, PageResult, Query};

/// Field holding a record's lifecycle status
pub const STATUS_FIELD: &str = "status";
/// Field holding a record's expiry date
pub const EXPIRY_FIELD: &str = "expiry";
/// Status value excluded from expiry lookups
pub const SUSPENDED_STATUS: &str = "suspended";

/// Handle to one record collection
pub struct DocumentStore<R: Record> {
    collection: Collection,
    path: PathBuf,
    codec: FileCodec,
    write_lock: WriteLock,
    seed: Arc<Vec<R>>,
}

impl<R: Record> Clone for DocumentStore<R> {
    fn clone(&self) -> Self {
        DocumentStore {
            collection: self.collection,
            path: self.path.clone(),
            codec: self.codec,
            write_lock: Arc::clone(&self.write_lock),
            seed: Arc::clone(&self.seed),
        }
    }
}

impl<R: Record> fmt::Debug for DocumentStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("collection", &self.collection)
            .field("path", &self.path)
            .field("seed_len", &self.seed.len())
            .finish()
    }
}

impl<R: Record> DocumentStore<R> {
    /// Create a store over `path`
    ///
    /// `seed` is written to the file the first time it is found missing.
    pub fn new(
        collection: Collection,
        path: impl Into<PathBuf>,
        codec: FileCodec,
        write_lock: WriteLock,
        seed: Vec<R>,
    ) -> Self {
        DocumentStore {
            collection,
            path: path.into(),
            codec,
            write_lock,
            seed: Arc::new(seed),
        }
    }

    /// Collection this store manages
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every record in file order
    pub fn find_all(&self) -> Vec<R> {
        self.load_for_read()
    }

    /// Filter, sort and page
    ///
    /// Out-of-range pages give an empty result.
    pub fn find(&self, query: &Query) -> Vec<R> {
        query.execute(self.load_for_read())
    }

    /// Like [`find`](Self::find), with the totals a pager needs
    pub fn find_page(&self, query: &Query) -> PageResult<R> {
        query.execute_paged(self.load_for_read())
    }

    /// Number of records matching `filter`
    pub fn count(&self, filter: &Filter) -> usize {
        Query::count(filter, &self.load_for_read())
    }

    /// Record with the given id
    pub fn find_by_id(&self, id: RecordId) -> Option<R> {
        self.load_for_read()
            .into_iter()
            .find(|record| record.id() == Some(id))
    }

    /// First record whose `field` equals `value`
    pub fn find_by_field(&self, field: &str, value: impl Into<Value>) -> Option<R> {
        let filter = Filter::new().eq(field, value);
        self.load_for_read()
            .into_iter()
            .find(|record| filter.matches(&record.to_json()))
    }

    /// Non-suspended records expiring within `window_days` of today (local date)
    pub fn find_expiring(&self, window_days: u32) -> Vec<R> {
        self.find_expiring_on(window_days, Local::now().date_naive())
    }

    /// Non-suspended records whose expiry falls in `[today, today + window_days]`
    ///
    /// Records with a missing or unparseable expiry are left out.
    pub fn find_expiring_on(&self, window_days: u32, today: NaiveDate) -> Vec<R> {
        let window = i64::from(window_days);
        self.load_for_read()
            .into_iter()
            .filter(|record| {
                let view = record.to_json();
                if view.get(STATUS_FIELD).and_then(Value::as_str) == Some(SUSPENDED_STATUS) {
                    return false;
                }
                let Some(expiry) = view
                    .get(EXPIRY_FIELD)
                    .and_then(Value::as_str)
                    .and_then(parse_date)
                else {
                    return false;
                };
                let days_left = (expiry - today).num_days();
                (0..=window).contains(&days_left)
            })
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a record, assigning an id when it has none
    ///
    /// # Errors
    ///
    /// `DuplicateId` when the supplied id is taken, `Corrupt` when the file
    /// cannot be parsed, `Io` when the save fails.
    pub fn create(&self, mut record: R) -> Result<R> {
        let _guard = self.write_lock.lock();
        let mut records = self.load_for_write()?;

        match record.id() {
            Some(id) if records.iter().any(|r| r.id() == Some(id)) => {
                return Err(StoreError::duplicate_id(self.collection.name(), id));
            }
            Some(_) => {}
            None => {
                let id = generate_id(|candidate| records.iter().any(|r| r.id() == Some(candidate)));
                record.set_id(id);
            }
        }
        record.stamp_created(timestamp_now());

        records.push(record.clone());
        self.codec.save(&self.path, &records)?;
        debug!(
            target: "clientdb::store",
            collection = %self.collection,
            id = ?record.id(),
            "Created record"
        );
        Ok(record)
    }

    /// Shallow-merge `patch` onto the record with `id`
    ///
    /// Fields in `patch` overwrite, fields absent from it are kept. `id` and
    /// `createdAt` in the patch are ignored. `updatedAt` is refreshed.
    ///
    /// # Errors
    ///
    /// `InvalidPatch` when `patch` is not an object or the merged record no
    /// longer decodes, `NotFound` when no record has `id`.
    pub fn update(&self, id: RecordId, patch: &Value) -> Result<R> {
        let Value::Object(fields) = patch else {
            return Err(StoreError::invalid_patch("patch must be a JSON object"));
        };

        let _guard = self.write_lock.lock();
        let mut records = self.load_for_write()?;
        let position = records
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or_else(|| StoreError::not_found(self.collection.name(), id))?;

        let mut merged = match records[position].to_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (field, value) in fields {
            if field == ID_FIELD || field == CREATED_AT_FIELD {
                continue;
            }
            merged.insert(field.clone(), value.clone());
        }

        let mut updated: R = serde_json::from_value(Value::Object(merged))
            .map_err(|e| StoreError::invalid_patch(e.to_string()))?;
        updated.stamp_updated(timestamp_now());

        records[position] = updated.clone();
        self.codec.save(&self.path, &records)?;
        debug!(
            target: "clientdb::store",
            collection = %self.collection,
            id,
            fields = fields.len(),
            "Updated record"
        );
        Ok(updated)
    }

    /// Remove the record with `id`
    ///
    /// Returns `false` without touching the file when no record has `id`.
    pub fn delete(&self, id: RecordId) -> Result<bool> {
        let _guard = self.write_lock.lock();
        let mut records = self.load_for_write()?;

        let before = records.len();
        records.retain(|r| r.id() != Some(id));
        if records.len() == before {
            return Ok(false);
        }

        self.codec.save(&self.path, &records)?;
        debug!(target: "clientdb::store", collection = %self.collection, id, "Deleted record");
        Ok(true)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    fn load_for_read(&self) -> Vec<R> {
        let loaded = match self.codec.load(&self.path) {
            Err(StoreError::FileNotFound { .. }) => {
                let _guard = self.write_lock.lock();
                self.load_for_write()
            }
            other => other,
        };
        loaded.unwrap_or_else(|e| {
            error!(
                target: "clientdb::store",
                collection = %self.collection,
                error = %e,
                "Collection unreadable, returning empty result"
            );
            Vec::new()
        })
    }

    /// Caller must hold the write lock
    fn load_for_write(&self) -> Result<Vec<R>> {
        match self.codec.load(&self.path) {
            Err(StoreError::FileNotFound { .. }) => self.write_seed(),
            other => other,
        }
    }

    fn write_seed(&self) -> Result<Vec<R>> {
        let seed = self.seed.as_ref().clone();
        self.codec.save(&self.path, &seed)?;
        info!(
            target: "clientdb::store",
            collection = %self.collection,
            records = seed.len(),
            path = %self.path.display(),
            "Seeded missing collection file"
        );
        Ok(seed)
    }
}
