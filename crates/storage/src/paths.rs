//! Store directory structure
//!
//! Collection files live flat in the data directory; backups live in a
//! separate root, one timestamp-named directory per snapshot:
//!
//! ```text
//! data/
//! ├── clients.json
//! ├── messages.json
//! ├── sessions.json
//! ├── logs.json
//! └── settings.json
//!
//! backups/
//! ├── backup-2024-05-01T03-00-00-000Z/
//! │   ├── clients.json
//! │   └── ...
//! └── ...
//! ```

use std::path::{Path, PathBuf};

use clientdb_core::Collection;

/// Store directory paths
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// Directory holding the collection files
    data_dir: PathBuf,
    /// Directory holding backup snapshots
    backup_dir: PathBuf,
}

impl DataPaths {
    /// Create paths from the two root directories
    pub fn new(data_dir: impl AsRef<Path>, backup_dir: impl AsRef<Path>) -> Self {
        DataPaths {
            data_dir: data_dir.as_ref().to_path_buf(),
            backup_dir: backup_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the backup root directory
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Get the file path of a collection
    pub fn collection(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    /// Check whether the data directory exists
    pub fn data_dir_exists(&self) -> bool {
        self.data_dir.is_dir()
    }

    /// Create the data and backup directories
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.backup_dir)?;
        Ok(())
    }
}
