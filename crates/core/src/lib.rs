//! Core types for clientdb
//!
//! This crate defines the foundational types used throughout the system:
//! - StoreError: Error taxonomy (not found, corrupt, I/O, invalid patch, config)
//! - Collection: The closed set of collections and their on-disk shape
//! - Record: Trait the store needs from a persisted record
//! - Document: Untyped JSON record
//! - ClientRecord / ClientStatus: The typed subscription client
//! - Date and timestamp helpers shared by the store and its tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod collection;
pub mod error;
pub mod record;

pub use client::{ClientRecord, ClientStatus, DEFAULT_PLAN};
pub use collection::{Collection, CollectionShape};
pub use error::{Result, StoreError};
pub use record::{
    format_timestamp, generate_id, monotonic_now, parse_date, parse_timestamp, timestamp_now,
    Document, Record, RecordId, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
