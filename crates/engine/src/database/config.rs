//! Store configuration via `clientdb.toml`
//!
//! Every setting has a default, so an empty file (or no file at all) gives a
//! working store rooted at `./data` with backups under `./backups`.

use std::path::{Path, PathBuf};

use clientdb_core::{Result, StoreError};
use clientdb_durability::{BackupRetention, HealthThresholds};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::query::OrSemantics;

/// Config file name looked up by [`Database::open_with_config_file`](crate::Database::open_with_config_file)
pub const CONFIG_FILE_NAME: &str = "clientdb.toml";

const MIB: u64 = 1024 * 1024;

/// Store configuration loaded from `clientdb.toml`.
///
/// # Example
///
/// ```toml
/// data_dir = "./data"
/// backup_dir = "./backups"
/// backup_retention_days = 30
/// or_semantics = "all_fields"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON file per collection
    pub data_dir: PathBuf,
    /// Directory holding timestamped backup snapshots
    pub backup_dir: PathBuf,
    /// Collection files larger than this are reported as a warning
    pub max_file_size_bytes: u64,
    /// Backups older than this many days are removed by cleanup
    pub backup_retention_days: u32,
    /// Free disk space below this is reported as a warning
    pub min_free_disk_bytes: u64,
    /// How `$or` branches with several fields are evaluated
    pub or_semantics: OrSemantics,
    /// fsync collection files on every write
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_dir: PathBuf::from("./data"),
            backup_dir: PathBuf::from("./backups"),
            max_file_size_bytes: 10 * MIB,
            backup_retention_days: 30,
            min_free_disk_bytes: 100 * MIB,
            or_semantics: OrSemantics::AllFields,
            sync_writes: true,
        }
    }
}

impl StoreConfig {
    /// Config rooted at `root`: `root/data` and `root/backups`
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        StoreConfig {
            data_dir: root.join("data"),
            backup_dir: root.join("backups"),
            ..StoreConfig::default()
        }
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the backup directory
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Set the file-size warning threshold
    pub fn with_max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// Set the backup retention window
    pub fn with_backup_retention_days(mut self, days: u32) -> Self {
        self.backup_retention_days = days;
        self
    }

    /// Set the free-disk warning threshold
    pub fn with_min_free_disk_bytes(mut self, bytes: u64) -> Self {
        self.min_free_disk_bytes = bytes;
        self
    }

    /// Set OR-branch evaluation
    pub fn with_or_semantics(mut self, semantics: OrSemantics) -> Self {
        self.or_semantics = semantics;
        self
    }

    /// Enable or disable fsync on write
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Check values that would make the store misbehave
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` for a zero retention window, a zero size
    /// threshold or an empty data directory path.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(StoreError::config("data_dir must not be empty"));
        }
        if self.backup_dir.as_os_str().is_empty() {
            return Err(StoreError::config("backup_dir must not be empty"));
        }
        if self.backup_retention_days == 0 {
            return Err(StoreError::config(
                "backup_retention_days must be at least 1",
            ));
        }
        if self.max_file_size_bytes == 0 {
            return Err(StoreError::config("max_file_size_bytes must be positive"));
        }
        Ok(())
    }

    /// Retention policy for backup cleanup
    pub fn retention(&self) -> BackupRetention {
        BackupRetention::days(self.backup_retention_days)
    }

    /// Thresholds for the health monitor
    pub fn health_thresholds(&self) -> HealthThresholds {
        HealthThresholds {
            max_file_size_bytes: self.max_file_size_bytes,
            min_free_disk_bytes: self.min_free_disk_bytes,
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# clientdb store configuration
#
# One JSON file per collection lives in data_dir.
data_dir = "./data"

# Timestamped backup snapshots are written under backup_dir.
backup_dir = "./backups"

# Backups older than this many days are removed by cleanup.
backup_retention_days = 30

# Health check warns when a collection file grows past this size (10 MiB).
max_file_size_bytes = 10485760

# Health check warns when free disk space drops below this (100 MiB).
min_free_disk_bytes = 104857600

# How "$or" branches with several fields are evaluated:
#   "all_fields"  = every field of a branch must match (default)
#   "first_field" = only the first field of each branch is checked
or_semantics = "all_fields"

# fsync every collection write. Disable only for throwaway data.
sync_writes = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            StoreError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        info!(target: "clientdb::config", path = %path.display(), "Loaded store configuration");
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StoreError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!(target: "clientdb::config", path = %path.display(), "Wrote default configuration");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StoreError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StoreError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
