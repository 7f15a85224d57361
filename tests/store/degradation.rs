//! Corrupt collection files: reads degrade, writes refuse

use clientdb::testing::CollectionCorruptor;

use crate::common::*;

#[test]
fn corrupt_file_reads_as_empty() {
    let store = TestStore::new();
    store.db.clients().find_all();
    let path = store.file(Collection::Clients);
    CollectionCorruptor::new(&path).truncate_tail(20).unwrap();

    let clients = store.db.clients();
    assert!(clients.find_all().is_empty());
    assert_eq!(clients.count(&Filter::new()), 0);
    assert!(clients.find_by_id(1).is_none());
    assert!(clients.find(&Query::new().page(1, 10)).is_empty());
    assert!(clients.find_expiring(30).is_empty());
}

#[test]
fn corrupt_file_is_never_reseeded_or_overwritten() {
    let store = TestStore::new();
    let path = store.file(Collection::Clients);
    CollectionCorruptor::new(&path).write_garbage().unwrap();
    let damaged = std::fs::read(&path).unwrap();

    let clients = store.db.clients();
    clients.find_all();
    assert!(clients.create(client(1, "Ana")).unwrap_err().is_corrupt());
    assert!(clients.update(1, &json!({"notes": "x"})).unwrap_err().is_corrupt());
    assert!(clients.delete(1).unwrap_err().is_corrupt());

    assert_eq!(std::fs::read(&path).unwrap(), damaged);
}

#[test]
fn wrong_shape_is_corrupt_not_missing() {
    let store = TestStore::new();
    let path = store.file(Collection::Messages);
    CollectionCorruptor::new(&path).write_wrong_shape().unwrap();

    let messages = store.db.messages();
    assert!(messages.find_all().is_empty());
    let err = messages.create(Document::new()).unwrap_err();
    assert!(err.is_corrupt());
    assert!(!err.is_not_found());
}

#[test]
fn corrupt_file_shows_up_in_health() {
    let store = TestStore::new();
    store.db.clients().find_all();
    CollectionCorruptor::new(store.file(Collection::Clients))
        .write_garbage()
        .unwrap();

    let report = store.db.check_health();
    assert!(!report.is_healthy());
    assert!(!report.files[&Collection::Clients].valid);
    assert!(report.issues.iter().any(|i| i.contains("clients")));
}

#[test]
fn one_corrupt_collection_does_not_affect_others() {
    let store = TestStore::new();
    CollectionCorruptor::new(store.file(Collection::Logs))
        .write_garbage()
        .unwrap();

    assert_eq!(store.db.clients().find_all().len(), 3);
    store.db.messages().create(Document::new().with("text", "hola")).unwrap();
    assert_eq!(store.db.messages().find_all().len(), 1);
}

#[test]
fn undecodable_client_record_empties_reads_and_fails_health() {
    let store = TestStore::new();
    store.db.messages().find_all();
    store.db.sessions().find_all();
    store.db.logs().find_all();
    store.db.settings().get();
    std::fs::write(
        store.file(Collection::Clients),
        r#"[{"id":1,"name":"Ana","phone":"1"},{"id":2,"phone":"2"}]"#,
    )
    .unwrap();

    assert!(store.db.clients().find_all().is_empty());
    assert!(store
        .db
        .clients()
        .create(client(3, "Bruno"))
        .unwrap_err()
        .is_corrupt());

    let report = store.db.check_health();
    assert_eq!(report.status, clientdb::HealthStatus::Unhealthy);
    assert!(!report.files[&Collection::Clients].valid);
    assert!(report
        .issues
        .iter()
        .any(|i| i.starts_with("clients.json is corrupt")));
}
