//! Backup retention window
//!
//! Backups newer than `now - days` are kept; anything older is eligible for
//! removal. The comparison uses the backup directory's modification time.

use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Age threshold for backup snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupRetention {
    days: u32,
}

impl BackupRetention {
    /// Keep backups for `days` days
    pub fn days(days: u32) -> Self {
        BackupRetention { days }
    }

    /// Retention window length in days
    pub fn window_days(&self) -> u32 {
        self.days
    }

    /// Retention window as a duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.days) * SECS_PER_DAY)
    }

    /// Oldest modification time that is still retained
    ///
    /// Saturates at the Unix epoch for windows reaching past it.
    pub fn cutoff(&self, now: SystemTime) -> SystemTime {
        now.checked_sub(self.window())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Check if a backup modified at `modified` should be retained
    pub fn should_retain(&self, modified: SystemTime, now: SystemTime) -> bool {
        modified >= self.cutoff(now)
    }
}
