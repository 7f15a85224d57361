//! Crash-safe collection file codec
//!
//! Reads and writes one collection as one pretty-printed JSON file.
//!
//! # Crash Safety
//!
//! Every save follows the write-fsync-rename pattern:
//! 1. Write the full document to a temporary file in the same directory
//!    (`.clients.json.<uuid>.tmp`)
//! 2. fsync the temporary file
//! 3. Atomic rename over the target path
//! 4. fsync the parent directory
//!
//! A reader therefore sees either the previous complete file or the new
//! complete file, never a partial one. A crash before step 3 leaves a
//! stray temporary file that [`FileCodec::cleanup_temp_files`] removes.
//!
//! # Load outcomes
//!
//! | File state | Result |
//! |------------|--------|
//! | absent | `StoreError::FileNotFound` |
//! | unreadable | `StoreError::Io` |
//! | not the expected JSON shape | `StoreError::Corrupt` |
//! | valid | decoded value |

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clientdb_core::{CollectionShape, Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

const TEMP_PREFIX: char = '.';
const TEMP_SUFFIX: &str = ".tmp";

/// Collection file reader/writer
#[derive(Debug, Clone, Copy)]
pub struct FileCodec {
    sync: bool,
}

impl Default for FileCodec {
    fn default() -> Self {
        FileCodec { sync: true }
    }
}

impl FileCodec {
    /// Create a codec that fsyncs every write
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec that skips fsync (rename is still atomic)
    ///
    /// Survives process crashes but not power loss. Meant for tests.
    pub fn without_sync() -> Self {
        FileCodec { sync: false }
    }

    /// Load a collection stored as a JSON array
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let bytes = read_file(path)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(path, e.to_string()))
    }

    /// Load a collection stored as a single JSON object
    pub fn load_object<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let bytes = read_file(path)?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(path, e.to_string()))?;
        if !value.is_object() {
            return Err(StoreError::corrupt(path, "expected a JSON object"));
        }
        serde_json::from_value(value).map_err(|e| StoreError::corrupt(path, e.to_string()))
    }

    /// Check that a file parses with the given shape, without decoding records
    pub fn validate(&self, path: &Path, shape: CollectionShape) -> Result<()> {
        let bytes = read_file(path)?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(path, e.to_string()))?;
        match (shape, &value) {
            (CollectionShape::Array, Value::Array(_)) => Ok(()),
            (CollectionShape::Object, Value::Object(_)) => Ok(()),
            (CollectionShape::Array, _) => Err(StoreError::corrupt(path, "expected a JSON array")),
            (CollectionShape::Object, _) => {
                Err(StoreError::corrupt(path, "expected a JSON object"))
            }
        }
    }

    /// Save a collection as a JSON array
    pub fn save<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<()> {
        self.stage(path, records)?.commit()
    }

    /// Save a single JSON object
    pub fn save_object<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.stage(path, value)?.commit()
    }

    /// Write `value` to a temporary file next to `path` without publishing it
    ///
    /// Creates missing parent directories. The target is untouched until
    /// [`StagedWrite::commit`] runs.
    pub fn stage<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<StagedWrite> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let dir = parent_dir(path);
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let temp_path = temp_path_for(path);
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .map_err(|e| StoreError::io(&temp_path, e))?;

        let staged = StagedWrite {
            temp_path,
            target: path.to_path_buf(),
            sync: self.sync,
            committed: false,
        };

        file.write_all(&bytes)
            .map_err(|e| StoreError::io(&staged.temp_path, e))?;
        if self.sync {
            file.sync_all()
                .map_err(|e| StoreError::io(&staged.temp_path, e))?;
        }

        debug!(
            target: "clientdb::codec",
            path = %path.display(),
            bytes = bytes.len(),
            "Staged collection write"
        );
        Ok(staged)
    }

    /// Remove temporary files left behind by interrupted writes
    ///
    /// Returns the number of files removed. A missing directory counts as zero.
    pub fn cleanup_temp_files(&self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in std::fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if is_temp_name(&name) {
                std::fs::remove_file(entry.path()).map_err(|e| StoreError::io(entry.path(), e))?;
                count += 1;
            }
        }

        if count > 0 {
            warn!(
                target: "clientdb::codec",
                dir = %dir.display(),
                removed = count,
                "Removed temporary files from interrupted writes"
            );
        }
        Ok(count)
    }
}

/// A fully written temporary file waiting to replace its target
///
/// Dropping an uncommitted `StagedWrite` removes the temporary file.
#[derive(Debug)]
pub struct StagedWrite {
    temp_path: PathBuf,
    target: PathBuf,
    sync: bool,
    committed: bool,
}

impl StagedWrite {
    /// Path of the temporary file
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Path the write will replace
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically publish the staged file over its target
    pub fn commit(mut self) -> Result<()> {
        std::fs::rename(&self.temp_path, &self.target)
            .map_err(|e| StoreError::io(&self.target, e))?;
        self.committed = true;

        if self.sync {
            sync_dir(&parent_dir(&self.target))?;
        }
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => StoreError::io(path, e),
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    parent_dir(path).join(format!(
        "{}{}.{}{}",
        TEMP_PREFIX,
        name,
        Uuid::new_v4().simple(),
        TEMP_SUFFIX
    ))
}

fn is_temp_name(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    let handle = File::open(dir).map_err(|e| StoreError::io(dir, e))?;
    handle.sync_all().map_err(|e| StoreError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
