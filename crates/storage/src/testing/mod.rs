//! Testing utilities for collection durability
//!
//! This module provides tools for testing the storage layer's resilience:
//!
//! - **Crash Harness**: Stops a save at a chosen point, as a killed process would
//! - **Corruption**: Damages collection files for corrupt-vs-missing checks
//!
//! # Example
//!
//! ```ignore
//! use clientdb_storage::testing::{CollectionCorruptor, CrashPoint, CrashSimulator};
//!
//! CollectionCorruptor::new(&path).truncate_tail(10)?;
//! ```

mod corruption;
mod crash_harness;

pub use corruption::CollectionCorruptor;
pub use crash_harness::{CrashPoint, CrashSimulator, DataState};
