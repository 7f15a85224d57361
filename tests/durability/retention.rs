//! Age-based backup cleanup

use crate::common::*;

#[test]
fn cleanup_removes_only_backups_past_retention() {
    let store = TestStore::with_config(|c| c.with_backup_retention_days(30));
    store.db.clients().find_all();

    let today = store.db.backup().unwrap().path;
    let ten_days = store.db.backup().unwrap().path;
    let forty_days = store.db.backup().unwrap().path;
    age_by_days(&ten_days, 10);
    age_by_days(&forty_days, 40);

    let report = store.db.cleanup_old_backups().unwrap();

    assert_eq!(report.removed, 1);
    assert!(report.failed.is_empty());
    assert!(today.exists());
    assert!(ten_days.exists());
    assert!(!forty_days.exists());
}

#[test]
fn shorter_retention_removes_more() {
    let store = TestStore::with_config(|c| c.with_backup_retention_days(7));
    let recent = store.db.backup().unwrap().path;
    let older = store.db.backup().unwrap().path;
    age_by_days(&older, 10);

    assert_eq!(store.db.cleanup_old_backups().unwrap().removed, 1);
    assert!(recent.exists());
    assert!(!older.exists());
}

#[test]
fn cleanup_ignores_stray_files_in_backup_root() {
    let store = TestStore::new();
    let note = store.backup_dir().join("README.txt");
    std::fs::write(&note, "manual notes").unwrap();
    age_by_days(&note, 400);

    assert_eq!(store.db.cleanup_old_backups().unwrap().removed, 0);
    assert!(note.exists());
}

#[test]
fn cleanup_with_nothing_to_do() {
    let store = TestStore::new();
    let report = store.db.cleanup_old_backups().unwrap();
    assert_eq!(report.removed, 0);
    assert!(report.failed.is_empty());
}
