//! Durability layer for clientdb
//!
//! This crate handles everything that inspects or copies collection files
//! outside the write path:
//!
//! - Backup: timestamped verbatim snapshots of every collection file
//! - Retention: age-based pruning of old snapshots
//! - Health: existence, size, parse-validity and disk headroom diagnostics
//!
//! Nothing here schedules itself. The surrounding application decides when
//! to call `backup`, `cleanup_old_backups` and `check_health`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backup;
pub mod health;
pub mod retention;

pub use backup::{
    backup_dir_name, BackupEntry, BackupManager, BackupReport, CleanupReport, FileBackupResult,
    FileBackupStatus, BACKUP_DIR_PREFIX,
};
pub use health::{
    DiskSpaceProbe, FileStats, FsDiskProbe, HealthMonitor, HealthReport, HealthStatus,
    HealthThresholds,
};
pub use retention::BackupRetention;
