//! Database handle and open logic
//!
//! A [`Database`] owns one data directory. It hands out store handles per
//! collection, and every handle for the same collection shares one write
//! lock, so mutations through any of them are serialized. Databases opened
//! on the same directory within one process share their locks too. Other
//! processes writing the same files are not coordinated.
//!
//! ## Opening
//!
//! 1. Validate the configuration
//! 2. Create the data and backup directories
//! 3. Join the lock set for the canonical data directory
//! 4. Remove temporary files left by writes interrupted before rename
//!
//! Collection files are not touched until first use, when missing ones are
//! seeded.

pub mod config;
mod registry;

pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use registry::{WriteLock, WriteLocks};

use std::path::Path;
use std::sync::Arc;

use clientdb_core::{Collection, Document, Result, StoreError};
use clientdb_durability::{
    BackupEntry, BackupManager, BackupReport, CleanupReport, HealthMonitor, HealthReport,
};
use clientdb_storage::{DataPaths, FileCodec};
use serde_json::Value;
use tracing::info;

use crate::query::Filter;
use crate::store::{sample_clients, ClientStore, DocumentStore, SettingsStore};

/// Open store over one data directory
#[derive(Debug)]
pub struct Database {
    config: StoreConfig,
    paths: DataPaths,
    codec: FileCodec,
    locks: Arc<WriteLocks>,
}

impl Database {
    /// Open the store described by `config`
    ///
    /// # Errors
    ///
    /// `Config` for invalid settings, `Io` when a directory cannot be
    /// created or scanned.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let paths = DataPaths::new(&config.data_dir, &config.backup_dir);
        paths
            .create_directories()
            .map_err(|e| StoreError::io(paths.data_dir(), e))?;
        let canonical = paths
            .data_dir()
            .canonicalize()
            .map_err(|e| StoreError::io(paths.data_dir(), e))?;
        let locks = WriteLocks::for_data_dir(&canonical);

        let codec = if config.sync_writes {
            FileCodec::new()
        } else {
            FileCodec::without_sync()
        };

        codec.cleanup_temp_files(paths.data_dir())?;

        info!(
            target: "clientdb::store",
            data_dir = %paths.data_dir().display(),
            backup_dir = %paths.backup_dir().display(),
            or_semantics = ?config.or_semantics,
            "Opened store"
        );

        Ok(Database {
            config,
            paths,
            codec,
            locks,
        })
    }

    /// Open using a TOML config file, writing the default file first if it is missing
    pub fn open_with_config_file(path: &Path) -> Result<Self> {
        StoreConfig::write_default_if_missing(path)?;
        Self::open(StoreConfig::from_file(path)?)
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Data and backup locations
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// The `clients` collection, seeded with sample clients on first use
    pub fn clients(&self) -> ClientStore {
        DocumentStore::new(
            Collection::Clients,
            self.paths.collection(Collection::Clients),
            self.codec,
            self.locks.get(Collection::Clients),
            sample_clients(),
        )
    }

    /// The `messages` collection
    pub fn messages(&self) -> DocumentStore<Document> {
        self.documents(Collection::Messages)
    }

    /// The `sessions` collection
    pub fn sessions(&self) -> DocumentStore<Document> {
        self.documents(Collection::Sessions)
    }

    /// The `logs` collection
    pub fn logs(&self) -> DocumentStore<Document> {
        self.documents(Collection::Logs)
    }

    /// The `settings` object
    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(
            self.paths.collection(Collection::Settings),
            self.codec,
            self.locks.get(Collection::Settings),
        )
    }

    fn documents(&self, collection: Collection) -> DocumentStore<Document> {
        DocumentStore::new(
            collection,
            self.paths.collection(collection),
            self.codec,
            self.locks.get(collection),
            Vec::new(),
        )
    }

    /// Parse a JSON filter using the configured OR semantics
    pub fn parse_filter(&self, value: &Value) -> Filter {
        Filter::from_json(value, self.config.or_semantics)
    }

    // =========================================================================
    // Backup and health
    // =========================================================================

    /// Backup manager over this store's directories
    pub fn backup_manager(&self) -> BackupManager {
        BackupManager::new(self.paths.clone())
    }

    /// Snapshot every collection file
    pub fn backup(&self) -> Result<BackupReport> {
        self.backup_manager().backup()
    }

    /// Backups, newest first
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        self.backup_manager().list_backups()
    }

    /// Remove backups older than the configured retention window
    pub fn cleanup_old_backups(&self) -> Result<CleanupReport> {
        self.backup_manager()
            .cleanup_old_backups(self.config.backup_retention_days)
    }

    /// Health monitor using the configured thresholds
    pub fn health_monitor(&self) -> HealthMonitor {
        HealthMonitor::new(self.paths.clone(), self.config.health_thresholds())
    }

    /// Run a health check
    pub fn check_health(&self) -> HealthReport {
        self.health_monitor().check_health()
    }
}
