//! Integration tests for the durability layer.
//!
//! These exercise the guarantees that only show up on a real directory:
//! atomic collection writes under simulated crashes, backup snapshots,
//! retention cleanup by directory age, and health diagnostics.

#[path = "../common/mod.rs"]
mod common;

mod health;
mod retention;
