//! The settings object

use crate::common::*;

#[test]
fn merge_is_shallow_and_persistent() {
    let mut store = TestStore::new();
    let settings = store.db.settings();
    settings
        .merge(&json!({"reminders": {"days": 3, "enabled": true}, "greeting": "Hola"}))
        .unwrap();
    settings.merge(&json!({"reminders": {"days": 5}})).unwrap();

    store.reopen();
    let current = store.db.settings().get();
    assert_eq!(current["reminders"], json!({"days": 5}));
    assert_eq!(current["greeting"], json!("Hola"));
}

#[test]
fn concurrent_merges_keep_every_key() {
    let store = TestStore::new();
    std::thread::scope(|scope| {
        for n in 0..8 {
            let settings = store.db.settings();
            scope.spawn(move || {
                let mut patch = serde_json::Map::new();
                patch.insert(format!("key{}", n), json!(n));
                settings.merge(&Value::Object(patch)).unwrap();
            });
        }
    });
    assert_eq!(store.db.settings().get().len(), 8);
}
