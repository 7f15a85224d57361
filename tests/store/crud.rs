//! Create / read / update / delete through the client store

use crate::common::*;

#[test]
fn create_then_find_by_id_returns_same_record() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();

    let input = client(1, "Ana López")
        .with_plan("Premium")
        .with_last_payment("2024-05-01");
    let created = clients.create(input.clone()).unwrap();

    let found = clients.find_by_id(created.id.unwrap()).unwrap();
    assert_eq!(found, created);

    // Equal to the input apart from server-assigned fields
    let mut expected = input;
    expected.id = created.id;
    expected.created_at = created.created_at;
    expected.updated_at = created.updated_at;
    assert_eq!(found, expected);
}

#[test]
fn create_keeps_caller_supplied_id() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();

    let mut input = client(1, "Ana");
    input.id = Some(77);
    let created = clients.create(input).unwrap();
    assert_eq!(created.id, Some(77));

    let mut clash = client(2, "Bruno");
    clash.id = Some(77);
    assert!(matches!(
        clients.create(clash),
        Err(StoreError::DuplicateId { id: 77, .. })
    ));
}

#[test]
fn generated_ids_are_unique() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();

    let mut ids: Vec<i64> = (0..50)
        .map(|n| clients.create(client(n, "x")).unwrap().id.unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[test]
fn update_changes_only_patched_fields() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();
    let created = clients.create(client(1, "Ana")).unwrap();
    let id = created.id.unwrap();

    let updated = clients.update(id, &json!({"notes": "x"})).unwrap();

    assert_eq!(updated.notes, "x");
    assert!(updated.updated_at >= created.updated_at);

    let mut expected = created.clone();
    expected.notes = "x".to_string();
    expected.updated_at = updated.updated_at;
    assert_eq!(updated, expected);
    assert_eq!(clients.find_by_id(id).unwrap(), updated);
}

#[test]
fn update_keeps_unknown_fields() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();
    let id = clients.create(client(1, "Ana")).unwrap().id.unwrap();

    clients
        .update(id, &json!({"referredBy": "Bruno", "tags": ["vip"]}))
        .unwrap();
    clients.update(id, &json!({"notes": "called"})).unwrap();

    let raw = read_json(&store.file(Collection::Clients));
    let on_disk = raw
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == json!(id))
        .unwrap();
    assert_eq!(on_disk["referredBy"], json!("Bruno"));
    assert_eq!(on_disk["tags"], json!(["vip"]));
    assert_eq!(on_disk["notes"], json!("called"));
}

#[test]
fn update_missing_record_is_not_found() {
    let store = TestStore::new().empty_clients();
    let err = store.db.clients().update(123, &json!({"notes": "x"})).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn update_never_moves_updated_at_before_created_at() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();
    let id = clients.create(client(1, "Ana")).unwrap().id.unwrap();

    for n in 0..5 {
        let updated = clients
            .update(id, &json!({ "notes": format!("edit {}", n) }))
            .unwrap();
        assert!(updated.updated_at >= updated.created_at);
    }
}

#[test]
fn delete_absent_returns_false_and_leaves_file() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();
    clients.create(client(1, "Ana")).unwrap();

    let path = store.file(Collection::Clients);
    let before = std::fs::read(&path).unwrap();

    assert!(!clients.delete(999).unwrap());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn delete_removes_record() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();
    let keep = clients.create(client(1, "Ana")).unwrap();
    let gone = clients.create(client(2, "Bruno")).unwrap();

    assert!(clients.delete(gone.id.unwrap()).unwrap());

    let all = clients.find_all();
    assert_eq!(all, vec![keep]);
}

#[test]
fn data_survives_reopen() {
    let mut store = TestStore::new().empty_clients();
    let id = store.db.clients().create(client(1, "Ana")).unwrap().id.unwrap();

    store.reopen();
    assert_eq!(store.db.clients().find_by_id(id).unwrap().name, "Ana");
}

#[test]
fn suspend_and_reactivate_round_trip() {
    let store = TestStore::new().empty_clients();
    let clients = store.db.clients();
    let id = clients.create(client(1, "Ana")).unwrap().id.unwrap();

    clients.suspend(id, "chargeback").unwrap();
    assert_eq!(
        clients.find_by_phone("+5491100000001").unwrap().status,
        ClientStatus::Suspended
    );

    clients.reactivate(id).unwrap();
    let client = clients.find_by_id(id).unwrap();
    assert_eq!(client.status, ClientStatus::Active);
    assert!(client.suspension_reason.is_none());
}

#[test]
fn document_collections_accept_free_form_records() {
    let store = TestStore::new();
    let messages = store.db.messages();

    let sent = messages
        .create(
            Document::new()
                .with("clientId", 1)
                .with("text", "Tu suscripción vence mañana")
                .with("delivered", false),
        )
        .unwrap();
    let id = sent.id().unwrap();

    let delivered = messages.update(id, &json!({"delivered": true})).unwrap();
    assert_eq!(delivered.get("delivered"), Some(&json!(true)));
    assert_eq!(delivered.get("text"), sent.get("text"));
    assert_eq!(
        messages.count(&Filter::new().eq("clientId", 1)),
        1
    );
}
