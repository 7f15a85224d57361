//! Settings store: a single JSON object instead of a record array
//!
//! Same rules as the record stores: the file is reloaded on every call,
//! a missing file is seeded (with `{}`), a corrupt file reads as empty and
//! refuses writes.

use std::path::{Path, PathBuf};

use clientdb_core::{Collection, Result, StoreError};
use clientdb_storage::FileCodec;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::database::WriteLock;

/// Handle to the `settings` collection
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    codec: FileCodec,
    write_lock: WriteLock,
}

impl SettingsStore {
    /// Create a settings store over `path`
    pub fn new(path: impl Into<PathBuf>, codec: FileCodec, write_lock: WriteLock) -> Self {
        SettingsStore {
            path: path.into(),
            codec,
            write_lock,
        }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings object
    pub fn get(&self) -> Map<String, Value> {
        let loaded = match self.codec.load_object(&self.path) {
            Err(StoreError::FileNotFound { .. }) => {
                let _guard = self.write_lock.lock();
                self.load_for_write()
            }
            other => other,
        };
        loaded.unwrap_or_else(|e| {
            error!(
                target: "clientdb::store",
                collection = %Collection::Settings,
                error = %e,
                "Settings unreadable, returning empty object"
            );
            Map::new()
        })
    }

    /// Single setting
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.get().remove(key)
    }

    /// Shallow-merge `patch` into the stored object and return the result
    ///
    /// # Errors
    ///
    /// `InvalidPatch` when `patch` is not an object; `Corrupt` or `Io` from
    /// the file.
    pub fn merge(&self, patch: &Value) -> Result<Map<String, Value>> {
        let Value::Object(fields) = patch else {
            return Err(StoreError::invalid_patch("settings patch must be a JSON object"));
        };

        let _guard = self.write_lock.lock();
        let mut settings = self.load_for_write()?;
        for (key, value) in fields {
            settings.insert(key.clone(), value.clone());
        }
        self.codec.save_object(&self.path, &settings)?;
        debug!(target: "clientdb::store", keys = fields.len(), "Merged settings");
        Ok(settings)
    }

    /// Overwrite the stored object
    pub fn replace(&self, settings: Map<String, Value>) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.codec.save_object(&self.path, &settings)?;
        debug!(target: "clientdb::store", keys = settings.len(), "Replaced settings");
        Ok(())
    }

    /// Caller must hold the write lock
    fn load_for_write(&self) -> Result<Map<String, Value>> {
        match self.codec.load_object(&self.path) {
            Err(StoreError::FileNotFound { .. }) => {
                let empty = Map::new();
                self.codec.save_object(&self.path, &empty)?;
                info!(
                    target: "clientdb::store",
                    collection = %Collection::Settings,
                    path = %self.path.display(),
                    "Seeded missing collection file"
                );
                Ok(empty)
            }
            other => other,
        }
    }
}
