//! Filtering, sorting and pagination through `find`

use crate::common::*;
use proptest::prelude::*;

fn names(clients: &[ClientRecord]) -> Vec<&str> {
    clients.iter().map(|c| c.name.as_str()).collect()
}

fn panel_store() -> TestStore {
    let clients = vec![
        ClientRecord::new("Bruno Díaz", "+5491100000001", "Netflix", "2030-01-01"),
        ClientRecord::new("Álvaro Peña", "+5491100000002", "Spotify", "2030-01-01")
            .with_status(ClientStatus::Expired),
        ClientRecord::new("ana Suárez", "+5491100000003", "Netflix", "2030-01-01")
            .with_status(ClientStatus::Suspended),
        ClientRecord::new("Carla Núñez", "+5491155500004", "Disney+", "2030-01-01"),
        ClientRecord::new("Óscar Ruiz", "+5491100000005", "Netflix", "2030-01-01"),
    ];
    let store = TestStore::new().empty_clients();
    for c in clients {
        store.db.clients().create(c).unwrap();
    }
    store
}

#[test]
fn empty_filter_matches_everything() {
    let store = panel_store();
    let clients = store.db.clients();
    assert_eq!(clients.find(&Query::new()).len(), 5);
    assert_eq!(clients.count(&Filter::new()), 5);
}

#[test]
fn top_level_fields_are_anded() {
    let store = panel_store();
    let filter = Filter::new().eq("service", "Netflix").eq("status", "active");

    let found = store.db.clients().find(&Query::filtered(filter.clone()));
    let mut found = names(&found);
    found.sort();
    assert_eq!(found, vec!["Bruno Díaz", "Óscar Ruiz"]);
    assert_eq!(store.db.clients().count(&filter), 2);
}

#[test]
fn search_box_or_over_name_and_phone() {
    let store = panel_store();
    let search = store.db.parse_filter(&json!({
        "$or": [
            {"name": {"$regex": "555", "$options": "i"}},
            {"phone": {"$regex": "555", "$options": "i"}}
        ]
    }));

    let found = store.db.clients().find(&Query::filtered(search));
    assert_eq!(names(&found), vec!["Carla Núñez"]);
}

#[test]
fn pattern_is_case_insensitive_with_i_flag() {
    let store = panel_store();
    let filter = Filter::new().regex("name", "^ANA", "i");
    assert_eq!(store.db.clients().count(&filter), 1);
    assert_eq!(store.db.clients().count(&Filter::new().regex("name", "^ANA", "")), 0);
}

#[test]
fn pattern_against_missing_field_sees_empty_string() {
    let store = panel_store();
    // No client has `referredBy`; an empty-matching pattern still matches
    assert_eq!(store.db.clients().count(&Filter::new().regex("referredBy", "^$", "")), 5);
    assert_eq!(store.db.clients().count(&Filter::new().regex("referredBy", ".+", "")), 0);
}

#[test]
fn unrecognized_condition_matches_nothing() {
    let store = panel_store();
    let filter = store.db.parse_filter(&json!({"createdAt": {"$gte": "2020-01-01"}}));
    assert!(store.db.clients().find(&Query::filtered(filter)).is_empty());
}

#[test]
fn or_branch_semantics_follow_config() {
    let legacy = TestStore::with_config(|c| c.with_or_semantics(OrSemantics::FirstField))
        .empty_clients();
    let strict = TestStore::new().empty_clients();
    for store in [&legacy, &strict] {
        store
            .db
            .clients()
            .create(
                ClientRecord::new("Eva", "1", "Netflix", "2030-01-01")
                    .with_status(ClientStatus::Expired),
            )
            .unwrap();
    }

    let raw = json!({"$or": [{"service": "Netflix", "status": "active"}]});
    let legacy_hits = legacy.db.clients().count(&legacy.db.parse_filter(&raw));
    let strict_hits = strict.db.clients().count(&strict.db.parse_filter(&raw));

    assert_eq!(legacy_hits, 1);
    assert_eq!(strict_hits, 0);
}

#[test]
fn sort_folds_accents() {
    let store = panel_store();
    let sorted = store
        .db
        .clients()
        .find(&Query::new().sort_by("name", SortOrder::Ascending));
    assert_eq!(
        names(&sorted),
        vec!["Álvaro Peña", "ana Suárez", "Bruno Díaz", "Carla Núñez", "Óscar Ruiz"]
    );

    let reversed = store
        .db
        .clients()
        .find(&Query::new().sort_by("name", SortOrder::Descending));
    assert_eq!(names(&reversed)[0], "Óscar Ruiz");
}

#[test]
fn sort_treats_missing_as_empty_string() {
    let store = panel_store();
    let clients = store.db.clients();
    let target = clients.find_by_phone("+5491100000005").unwrap().id.unwrap();
    clients.update(target, &json!({"lastPayment": "2024-01-01"})).unwrap();

    let sorted = clients.find(&Query::new().sort_by("lastPayment", SortOrder::Descending));
    assert_eq!(sorted[0].name, "Óscar Ruiz");
}

#[test]
fn out_of_range_page_is_empty() {
    let store = panel_store();
    let clients = store.db.clients();
    assert!(clients.find(&Query::new().page(3, 5)).is_empty());
    assert!(clients.find(&Query::new().page(0, 5)).is_empty());

    let result = clients.find_page(&Query::new().page(9, 2));
    assert!(result.items.is_empty());
    assert_eq!(result.total, 5);
    assert_eq!(result.total_pages, 3);
}

#[test]
fn filter_then_sort_then_page() {
    let store = panel_store();
    let query = Query::filtered(Filter::new().eq("service", "Netflix"))
        .sort_by("name", SortOrder::Ascending)
        .page(2, 2);

    let page = store.db.clients().find_page(&query);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(names(&page.items), vec!["Óscar Ruiz"]);
}

#[test]
fn expiring_window_excludes_suspended_and_unparseable() {
    let today = Local::now().date_naive();
    let rows = vec![
        ClientRecord::new("in window", "1", "X", date_from(today, 2)),
        ClientRecord::new("today", "2", "X", date_from(today, 0)),
        ClientRecord::new("edge", "3", "X", date_from(today, 7)),
        ClientRecord::new("beyond", "4", "X", date_from(today, 8)),
        ClientRecord::new("lapsed", "5", "X", date_from(today, -1)),
        ClientRecord::new("paused", "6", "X", date_from(today, 1))
            .with_status(ClientStatus::Suspended),
        ClientRecord::new("typo", "7", "X", "31/12/2030"),
    ];
    let store = TestStore::new().empty_clients();
    for row in rows {
        store.db.clients().create(row).unwrap();
    }

    let expiring = store.db.clients().find_expiring_on(7, today);
    let mut found = names(&expiring);
    found.sort();
    assert_eq!(found, vec!["edge", "in window", "today"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn pages_partition_sorted_result(count in 0usize..30, size in 1usize..8) {
        let store = TestStore::new().empty_clients();
        let clients = store.db.clients();
        for n in 0..count {
            clients.create(client(n, &format!("client {:02}", (n * 7) % 31))).unwrap();
        }

        let sorted = clients.find(&Query::new().sort_by("name", SortOrder::Ascending));
        let total_pages = count.div_ceil(size);

        let mut collected = Vec::new();
        for page in 1..=total_pages {
            let items = clients.find(
                &Query::new().sort_by("name", SortOrder::Ascending).page(page, size),
            );
            prop_assert!(!items.is_empty());
            prop_assert!(items.len() <= size);
            if page < total_pages {
                prop_assert_eq!(items.len(), size);
            }
            collected.extend(items);
        }

        prop_assert_eq!(collected, sorted);
    }
}
