//! Store health diagnostics
//!
//! Inspects the collection files on disk and reports a composite status.
//! The check never fails: anything it cannot determine becomes an issue
//! string plus an `Unhealthy` status.
//!
//! # Status rules
//!
//! | Condition | Status |
//! |-----------|--------|
//! | data directory missing | unhealthy |
//! | collection file missing | unhealthy |
//! | collection file or one of its records does not decode | unhealthy |
//! | disk probe failed | unhealthy |
//! | free disk space below floor | warning |
//! | file larger than max size | issue only |
//!
//! Precedence is `Unhealthy > Warning > Healthy`.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use clientdb_core::{ClientRecord, Collection, Document, Result, StoreError};
use clientdb_storage::{DataPaths, FileCodec};
use serde::Serialize;
use tracing::{debug, warn};

/// Composite health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Everything checked out
    Healthy,
    /// Degraded but serving
    Warning,
    /// Data missing, unreadable or unverifiable
    Unhealthy,
}

impl HealthStatus {
    /// Combine two statuses, keeping the more severe
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        self.max(other)
    }
}

/// Per-file statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    /// File exists
    pub exists: bool,
    /// Size in bytes (0 when missing)
    pub size_bytes: u64,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
    /// File parsed with its expected shape
    pub valid: bool,
}

/// Result of a health check
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Composite status
    pub status: HealthStatus,
    /// Human-readable issues, in detection order
    pub issues: Vec<String>,
    /// Per-collection file statistics
    pub files: BTreeMap<Collection, FileStats>,
    /// Free bytes on the data volume, when the probe succeeded
    pub free_disk_bytes: Option<u64>,
    /// When the check ran
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    fn new() -> Self {
        HealthReport {
            status: HealthStatus::Healthy,
            issues: Vec::new(),
            files: BTreeMap::new(),
            free_disk_bytes: None,
            checked_at: Utc::now(),
        }
    }

    fn raise(&mut self, status: HealthStatus, issue: String) {
        self.status = self.status.worst(status);
        self.issues.push(issue);
    }

    /// True if status is `Healthy`
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Thresholds the health check compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    /// Files larger than this add an issue
    pub max_file_size_bytes: u64,
    /// Free space below this sets `Warning`
    pub min_free_disk_bytes: u64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        HealthThresholds {
            max_file_size_bytes: 10 * 1024 * 1024,
            min_free_disk_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Source of free-disk-space readings
pub trait DiskSpaceProbe: Send + Sync {
    /// Free bytes available to this process on the volume holding `path`
    fn available_space(&self, path: &Path) -> io::Result<u64>;
}

/// Disk probe backed by `fs2`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDiskProbe;

impl DiskSpaceProbe for FsDiskProbe {
    fn available_space(&self, path: &Path) -> io::Result<u64> {
        fs2::available_space(path)
    }
}

/// Runs health checks over a store's data directory
pub struct HealthMonitor {
    paths: DataPaths,
    codec: FileCodec,
    thresholds: HealthThresholds,
    probe: Box<dyn DiskSpaceProbe>,
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("paths", &self.paths)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl HealthMonitor {
    /// Create a monitor using the `fs2` disk probe
    pub fn new(paths: DataPaths, thresholds: HealthThresholds) -> Self {
        Self::with_probe(paths, thresholds, Box::new(FsDiskProbe))
    }

    /// Create a monitor with a custom disk probe
    pub fn with_probe(
        paths: DataPaths,
        thresholds: HealthThresholds,
        probe: Box<dyn DiskSpaceProbe>,
    ) -> Self {
        HealthMonitor {
            paths,
            codec: FileCodec::new(),
            thresholds,
            probe,
        }
    }

    /// Run all checks
    pub fn check_health(&self) -> HealthReport {
        let mut report = HealthReport::new();

        if !self.paths.data_dir_exists() {
            report.raise(
                HealthStatus::Unhealthy,
                format!(
                    "Data directory does not exist: {}",
                    self.paths.data_dir().display()
                ),
            );
            for collection in Collection::all() {
                report.files.insert(*collection, FileStats::default());
            }
            self.log(&report);
            return report;
        }

        for collection in Collection::all() {
            let stats = self.check_file(*collection, &mut report);
            report.files.insert(*collection, stats);
        }

        self.check_disk(&mut report);
        self.log(&report);
        report
    }

    fn check_file(&self, collection: Collection, report: &mut HealthReport) -> FileStats {
        let path = self.paths.collection(collection);
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                report.raise(
                    HealthStatus::Unhealthy,
                    format!("{} does not exist", collection.file_name()),
                );
                return FileStats::default();
            }
            Err(e) => {
                report.raise(
                    HealthStatus::Unhealthy,
                    format!("{} could not be inspected: {}", collection.file_name(), e),
                );
                return FileStats::default();
            }
        };

        let mut stats = FileStats {
            exists: true,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            valid: false,
        };

        if stats.size_bytes > self.thresholds.max_file_size_bytes {
            report.issues.push(format!(
                "{} is {} bytes, above the {} byte limit",
                collection.file_name(),
                stats.size_bytes,
                self.thresholds.max_file_size_bytes
            ));
        }

        match self.decode(collection, &path) {
            Ok(()) => stats.valid = true,
            Err(StoreError::Corrupt { reason, .. }) => report.raise(
                HealthStatus::Unhealthy,
                format!("{} is corrupt: {}", collection.file_name(), reason),
            ),
            Err(e) => report.raise(
                HealthStatus::Unhealthy,
                format!("{} could not be read: {}", collection.file_name(), e),
            ),
        }

        stats
    }

    /// Decode every record with the type its store reads it as
    fn decode(&self, collection: Collection, path: &Path) -> Result<()> {
        match collection {
            Collection::Clients => self.codec.load::<ClientRecord>(path).map(drop),
            Collection::Messages | Collection::Sessions | Collection::Logs => {
                self.codec.load::<Document>(path).map(drop)
            }
            Collection::Settings => self.codec.validate(path, collection.shape()),
        }
    }

    fn check_disk(&self, report: &mut HealthReport) {
        match self.probe.available_space(self.paths.data_dir()) {
            Ok(free) => {
                report.free_disk_bytes = Some(free);
                if free < self.thresholds.min_free_disk_bytes {
                    report.raise(
                        HealthStatus::Warning,
                        format!(
                            "Low disk space: {} bytes free, below the {} byte floor",
                            free, self.thresholds.min_free_disk_bytes
                        ),
                    );
                }
            }
            Err(e) => report.raise(
                HealthStatus::Unhealthy,
                format!("Disk space check failed: {}", e),
            ),
        }
    }

    fn log(&self, report: &HealthReport) {
        if report.is_healthy() && report.issues.is_empty() {
            debug!(target: "clientdb::health", "Health check passed");
        } else {
            warn!(
                target: "clientdb::health",
                status = ?report.status,
                issues = report.issues.len(),
                "Health check found issues"
            );
        }
    }
}
