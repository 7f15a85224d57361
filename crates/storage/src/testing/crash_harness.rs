//! Crash harness for collection writes
//!
//! Runs a save up to a chosen injection point and stops there without any
//! cleanup, leaving the directory exactly as a killed process would.
//!
//! # Crash Points
//!
//! | Point | Disk state left behind | Visible collection |
//! |-------|------------------------|--------------------|
//! | `BeforeTempWrite` | nothing new | original |
//! | `AfterTempWriteBeforeRename` | complete temp file | original |
//! | `AfterRename` | new file in place | new |
//!
//! # Example
//!
//! ```ignore
//! use clientdb_storage::testing::{CrashPoint, CrashSimulator};
//!
//! let sim = CrashSimulator::new(FileCodec::new());
//! sim.save_and_crash(&path, &records, CrashPoint::AfterTempWriteBeforeRename)?;
//! // path still holds the previous collection
//! ```

use std::path::Path;

use clientdb_core::Result;
use serde::Serialize;

use crate::codec::FileCodec;

/// Crash injection points in a collection save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrashPoint {
    /// Process dies before the temporary file is created
    BeforeTempWrite,
    /// Temporary file is complete and synced; rename never happens
    AfterTempWriteBeforeRename,
    /// Rename completed; the process dies before returning
    AfterRename,
}

impl CrashPoint {
    /// Get all crash points
    pub fn all() -> Vec<CrashPoint> {
        vec![
            CrashPoint::BeforeTempWrite,
            CrashPoint::AfterTempWriteBeforeRename,
            CrashPoint::AfterRename,
        ]
    }

    /// Get description of crash point
    pub fn description(&self) -> &'static str {
        match self {
            CrashPoint::BeforeTempWrite => "Before temporary file write",
            CrashPoint::AfterTempWriteBeforeRename => "After temporary write, before rename",
            CrashPoint::AfterRename => "After atomic rename",
        }
    }

    /// Which version of the collection a reader sees after this crash
    pub fn expected_data_state(&self) -> DataState {
        match self {
            CrashPoint::BeforeTempWrite => DataState::Original,
            CrashPoint::AfterTempWriteBeforeRename => DataState::Original,
            CrashPoint::AfterRename => DataState::Updated,
        }
    }
}

/// Expected collection contents after a crash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    /// The file still holds what was there before the save
    Original,
    /// The file holds the new contents
    Updated,
}

/// Performs saves that stop at a crash point
#[derive(Debug, Clone, Copy, Default)]
pub struct CrashSimulator {
    codec: FileCodec,
}

impl CrashSimulator {
    /// Create a simulator around a codec
    pub fn new(codec: FileCodec) -> Self {
        CrashSimulator { codec }
    }

    /// Run a save of `records` to `path`, abandoning it at `point`
    ///
    /// Nothing past the crash point runs, including the temporary file
    /// cleanup an orderly failure would perform.
    pub fn save_and_crash<T: Serialize>(
        &self,
        path: &Path,
        records: &[T],
        point: CrashPoint,
    ) -> Result<()> {
        match point {
            CrashPoint::BeforeTempWrite => Ok(()),
            CrashPoint::AfterTempWriteBeforeRename => {
                let staged = self.codec.stage(path, records)?;
                std::mem::forget(staged);
                Ok(())
            }
            CrashPoint::AfterRename => self.codec.stage(path, records)?.commit(),
        }
    }
}
