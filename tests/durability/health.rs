//! Health diagnostics over a live store

use std::io;
use std::path::Path;

use clientdb::testing::CollectionCorruptor;
use clientdb::{DiskSpaceProbe, HealthMonitor, HealthStatus, HealthThresholds};

use crate::common::*;

struct FixedProbe(u64);

impl DiskSpaceProbe for FixedProbe {
    fn available_space(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

fn monitor(store: &TestStore, free: u64) -> HealthMonitor {
    HealthMonitor::with_probe(
        store.db.paths().clone(),
        store.db.config().health_thresholds(),
        Box::new(FixedProbe(free)),
    )
}

fn touch_all(store: &TestStore) {
    store.db.clients().find_all();
    store.db.messages().find_all();
    store.db.sessions().find_all();
    store.db.logs().find_all();
    store.db.settings().get();
}

#[test]
fn fully_seeded_store_is_healthy() {
    let store = TestStore::new();
    touch_all(&store);

    let report = monitor(&store, u64::MAX).check_health();
    assert_eq!(report.status, HealthStatus::Healthy, "{:?}", report.issues);
    assert!(report.issues.is_empty());
    assert!(report.files.values().all(|f| f.exists && f.valid));
    assert_eq!(report.free_disk_bytes, Some(u64::MAX));
}

#[test]
fn fresh_store_reports_missing_files() {
    let store = TestStore::new();
    let report = monitor(&store, u64::MAX).check_health();

    assert_ne!(report.status, HealthStatus::Healthy);
    assert_eq!(report.issues.len(), Collection::ALL.len());
    assert!(report.files.values().all(|f| !f.exists));
}

#[test]
fn corrupt_settings_is_unhealthy() {
    let store = TestStore::new();
    touch_all(&store);
    CollectionCorruptor::new(store.file(Collection::Settings))
        .write_wrong_shape()
        .unwrap();

    let report = monitor(&store, u64::MAX).check_health();
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(!report.files[&Collection::Settings].valid);
    assert!(report.files[&Collection::Clients].valid);
}

#[test]
fn low_disk_is_warning() {
    let store = TestStore::new();
    touch_all(&store);

    let threshold = store.db.config().min_free_disk_bytes;
    let report = monitor(&store, threshold - 1).check_health();
    assert_eq!(report.status, HealthStatus::Warning);
    assert_eq!(report.issues.len(), 1);
}

#[test]
fn oversized_file_is_reported() {
    let store = TestStore::with_config(|c| c.with_max_file_size_bytes(64));
    touch_all(&store);

    let report = monitor(&store, u64::MAX).check_health();
    assert!(report.issues.iter().any(|i| i.contains("clients.json")));
    assert!(report.files[&Collection::Clients].size_bytes > 64);
}

#[test]
fn missing_data_dir_is_unhealthy_without_panicking() {
    let store = TestStore::new();
    std::fs::remove_dir_all(store.data_dir()).unwrap();

    let report = HealthMonitor::new(store.db.paths().clone(), HealthThresholds::default())
        .check_health();
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(report.files.values().all(|f| !f.exists));
}
