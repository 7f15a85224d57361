//! Storage layer for clientdb
//!
//! This crate owns the on-disk representation of collections:
//! - DataPaths: data and backup directory layout
//! - FileCodec: JSON load/save with write-fsync-rename atomicity
//! - StagedWrite: a written but unpublished collection file
//! - Testing utilities: crash-point simulation and file corruption

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod paths;
pub mod testing;

pub use codec::{FileCodec, StagedWrite};
pub use paths::DataPaths;
