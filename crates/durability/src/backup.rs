//! Backup snapshots and retention cleanup
//!
//! A backup is a directory under the backup root named after the moment it
//! was taken (`backup-2024-05-01T03-00-00-000Z`), holding verbatim copies of
//! every collection file that existed at that moment.
//!
//! # Consistency
//!
//! Copies run concurrently and outside the per-collection write lock.
//! Collection files are only ever replaced by atomic rename, so each copy
//! captures either the pre-write or the post-write file, never a torn one.
//! Different files in one backup may straddle a concurrent write.
//!
//! # Failure isolation
//!
//! Only failing to create the backup directory fails the whole call. A
//! missing collection is reported as `NotFound`; a failed copy is reported
//! as `Failed` and does not stop the other copies. Cleanup likewise skips
//! directories it cannot remove and reports them.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use clientdb_core::{format_timestamp, Collection, Result, StoreError};
use clientdb_storage::DataPaths;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::retention::BackupRetention;

/// Prefix of backup directory names
pub const BACKUP_DIR_PREFIX: &str = "backup-";

/// Outcome of copying one collection file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileBackupStatus {
    /// File copied
    Copied {
        /// Bytes copied
        bytes: u64,
    },
    /// Collection file did not exist; nothing to copy
    NotFound,
    /// Copy failed
    Failed {
        /// Error message
        error: String,
    },
}

/// Per-file result of a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileBackupResult {
    /// Collection the file belongs to
    pub collection: Collection,
    /// Outcome
    #[serde(flatten)]
    pub status: FileBackupStatus,
}

impl FileBackupResult {
    /// True if the file was copied
    pub fn is_copied(&self) -> bool {
        matches!(self.status, FileBackupStatus::Copied { .. })
    }
}

/// Result of a backup run
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    /// Directory the backup was written to
    pub path: PathBuf,
    /// One entry per recognized collection, in `Collection::ALL` order
    pub files: Vec<FileBackupResult>,
    /// When the backup was taken
    pub timestamp: DateTime<Utc>,
}

impl BackupReport {
    /// Number of files copied
    pub fn copied(&self) -> usize {
        self.files.iter().filter(|f| f.is_copied()).count()
    }

    /// Result for one collection
    pub fn file(&self, collection: Collection) -> Option<&FileBackupResult> {
        self.files.iter().find(|f| f.collection == collection)
    }
}

/// Result of a retention cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Backup directories removed
    pub removed: usize,
    /// Expired directories that could not be removed
    pub failed: Vec<PathBuf>,
}

/// A backup directory found under the backup root
#[derive(Debug, Clone)]
pub struct BackupEntry {
    /// Directory path
    pub path: PathBuf,
    /// Directory name
    pub name: String,
    /// Modification time
    pub modified: SystemTime,
}

/// Creates backup snapshots and prunes old ones
#[derive(Debug, Clone)]
pub struct BackupManager {
    paths: DataPaths,
}

impl BackupManager {
    /// Create a backup manager over a store's directories
    pub fn new(paths: DataPaths) -> Self {
        BackupManager { paths }
    }

    /// Backup root directory
    pub fn backup_dir(&self) -> &Path {
        self.paths.backup_dir()
    }

    /// Snapshot every collection file into a new timestamped directory
    pub fn backup(&self) -> Result<BackupReport> {
        let timestamp = Utc::now();
        let target = self.create_backup_dir(timestamp)?;

        let files: Vec<FileBackupResult> = Collection::all()
            .par_iter()
            .map(|&collection| FileBackupResult {
                collection,
                status: copy_collection(&self.paths.collection(collection), &target, collection),
            })
            .collect();

        let report = BackupReport {
            path: target,
            files,
            timestamp,
        };

        let failed = report
            .files
            .iter()
            .filter(|f| matches!(f.status, FileBackupStatus::Failed { .. }))
            .count();
        if failed > 0 {
            warn!(
                target: "clientdb::backup",
                path = %report.path.display(),
                failed,
                "Backup completed with failed copies"
            );
        } else {
            info!(
                target: "clientdb::backup",
                path = %report.path.display(),
                copied = report.copied(),
                "Backup completed"
            );
        }
        Ok(report)
    }

    /// List backup directories, newest first
    ///
    /// A missing backup root yields an empty list.
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        let root = self.paths.backup_dir();
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(root, e)),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(root, e))?;
            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_dir() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    warn!(
                        target: "clientdb::backup",
                        path = %entry.path().display(),
                        error = %e,
                        "Skipping unreadable backup entry"
                    );
                    continue;
                }
            };
            backups.push(BackupEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().to_string(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(backups)
    }

    /// Remove backup directories older than `retention_days`
    pub fn cleanup_old_backups(&self, retention_days: u32) -> Result<CleanupReport> {
        self.cleanup_old_backups_at(retention_days, SystemTime::now())
    }

    /// Remove backup directories older than `retention_days` relative to `now`
    pub fn cleanup_old_backups_at(
        &self,
        retention_days: u32,
        now: SystemTime,
    ) -> Result<CleanupReport> {
        let retention = BackupRetention::days(retention_days);
        let mut report = CleanupReport::default();

        for backup in self.list_backups()? {
            if retention.should_retain(backup.modified, now) {
                continue;
            }
            match std::fs::remove_dir_all(&backup.path) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    warn!(
                        target: "clientdb::backup",
                        path = %backup.path.display(),
                        error = %e,
                        "Failed to remove expired backup"
                    );
                    report.failed.push(backup.path);
                }
            }
        }

        info!(
            target: "clientdb::backup",
            retention_days,
            removed = report.removed,
            failed = report.failed.len(),
            "Backup cleanup finished"
        );
        Ok(report)
    }

    fn create_backup_dir(&self, timestamp: DateTime<Utc>) -> Result<PathBuf> {
        let root = self.paths.backup_dir();
        std::fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))?;

        let base = backup_dir_name(timestamp);
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, attempt)
            };
            let path = root.join(name);
            match std::fs::create_dir(&path) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(StoreError::io(&path, e)),
            }
        }
    }
}

/// Filesystem-safe directory name for a backup taken at `timestamp`
pub fn backup_dir_name(timestamp: DateTime<Utc>) -> String {
    let safe = format_timestamp(timestamp).replace(|c: char| c == ':' || c == '.', "-");
    format!("{}{}", BACKUP_DIR_PREFIX, safe)
}

fn copy_collection(source: &Path, target_dir: &Path, collection: Collection) -> FileBackupStatus {
    let destination = target_dir.join(collection.file_name());
    match std::fs::copy(source, &destination) {
        Ok(bytes) => FileBackupStatus::Copied { bytes },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !source.exists() => {
            FileBackupStatus::NotFound
        }
        Err(e) => {
            warn!(
                target: "clientdb::backup",
                collection = %collection,
                error = %e,
                "Failed to copy collection file"
            );
            FileBackupStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}
