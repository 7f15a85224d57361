//! Collection file corruption utilities
//!
//! Damages collection files on purpose so tests can check that the store
//! and the health monitor tell a corrupt file apart from a missing one.
//!
//! # Corruption Types
//!
//! - Truncation: cuts bytes off the tail (simulates a torn non-atomic write)
//! - Garbage: overwrites the file with bytes that are not JSON
//! - Wrong shape: valid JSON with the wrong top-level type

use std::path::{Path, PathBuf};

/// Collection file corruption helper
pub struct CollectionCorruptor {
    path: PathBuf,
}

impl CollectionCorruptor {
    /// Create a corruptor for one collection file
    pub fn new(path: impl AsRef<Path>) -> Self {
        CollectionCorruptor {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Remove `bytes_to_remove` bytes from the end of the file
    ///
    /// Returns the new size. A file shorter than the cut is left untouched.
    pub fn truncate_tail(&self, bytes_to_remove: u64) -> std::io::Result<u64> {
        let original_size = std::fs::metadata(&self.path)?.len();
        if original_size <= bytes_to_remove {
            return Ok(original_size);
        }

        let new_size = original_size - bytes_to_remove;
        let file = std::fs::OpenOptions::new().write(true).open(&self.path)?;
        file.set_len(new_size)?;
        Ok(new_size)
    }

    /// Replace the file with non-JSON bytes
    pub fn write_garbage(&self) -> std::io::Result<()> {
        std::fs::write(&self.path, [0xFF, 0x00, 0x7B, 0x5B, 0xDE, 0xAD])
    }

    /// Replace the file with valid JSON of the wrong shape
    pub fn write_wrong_shape(&self) -> std::io::Result<()> {
        std::fs::write(&self.path, b"\"not a collection\"")
    }
}
