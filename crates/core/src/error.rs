//! Error types for clientdb
//!
//! This module defines the single error type used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Taxonomy
//!
//! | Variant | Meaning | Recoverable |
//! |---------|---------|-------------|
//! | `NotFound` | record id is not present in the collection | yes |
//! | `FileNotFound` | collection file is absent (triggers seeding) | yes |
//! | `Corrupt` | file exists but does not parse with the expected shape | no |
//! | `Io` | write, copy or rename failed | caller decides |
//! | `DuplicateId` | create was handed an id the collection already holds | yes |
//! | `InvalidPatch` | an update would produce a record that no longer decodes | yes |
//! | `Config` | configuration is unreadable or invalid | no |
//!
//! A missing file and a corrupt file are never conflated: the first is an
//! expected first-run condition, the second is a health issue.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::RecordId;

/// Result type alias for clientdb operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for the document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record with the given id does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Collection the lookup ran against
        entity: String,
        /// Id that was looked up
        id: RecordId,
    },

    /// Collection file does not exist
    #[error("collection file not found: {}", path.display())]
    FileNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Collection file exists but cannot be parsed
    #[error("corrupt collection file {}: {reason}", path.display())]
    Corrupt {
        /// Path of the corrupt file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// I/O error while writing, copying or renaming
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Create was given an id that is already taken
    #[error("{entity} {id} already exists")]
    DuplicateId {
        /// Collection the create ran against
        entity: String,
        /// Conflicting id
        id: RecordId,
    },

    /// Update patch produced a record that fails to decode
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// Configuration could not be read or is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create a not-found error for a record id
    pub fn not_found(entity: impl Into<String>, id: RecordId) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Create a corrupt-file error
    pub fn corrupt(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a duplicate-id error
    pub fn duplicate_id(entity: impl Into<String>, id: RecordId) -> Self {
        StoreError::DuplicateId {
            entity: entity.into(),
            id,
        }
    }

    /// Create an invalid-patch error
    pub fn invalid_patch(msg: impl Into<String>) -> Self {
        StoreError::InvalidPatch(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        StoreError::Config(msg.into())
    }

    /// True for `NotFound` and `FileNotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::FileNotFound { .. }
        )
    }

    /// True for `Corrupt`
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}
