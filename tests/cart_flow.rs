mod common;

use std::sync::Arc;

use arturo_cart::{
    models::CartLine,
    services::reminder_service::ReminderState,
    storage::{FileStore, KeyValueStore, MemoryStore, PersistentStore},
};
use common::{Harness, product, t0};

#[test]
fn quantity_is_sum_of_deltas_or_removed() {
    let harness = Harness::new();
    let mut cart = harness.manager();
    let shirt = product(1, 10.0);

    for delta in [2, 3, -1, 4] {
        cart.add_line(&shirt, delta);
    }
    assert_eq!(cart.line(1).map(|l| l.quantity), Some(8));

    cart.add_line(&shirt, -8);
    assert!(cart.line(1).is_none());
}

#[test]
fn add_two_then_three_gives_five_and_total_fifty() {
    let harness = Harness::new();
    let mut cart = harness.manager();

    cart.add_line(&product(1, 10.0), 2);
    cart.add_line(&product(1, 10.0), 3);

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].quantity, 5);
    assert_eq!(cart.total(), 50.0);
}

#[test]
fn total_does_not_depend_on_mutation_order() {
    let a = Harness::new();
    let b = Harness::new();
    let mut first = a.manager();
    let mut second = b.manager();

    first.add_line(&product(1, 129.99), 1);
    first.add_line(&product(2, 119.99), 2);
    first.add_line(&product(3, 70.99), 3);

    second.add_line(&product(3, 70.99), 3);
    second.add_line(&product(2, 119.99), 2);
    second.add_line(&product(1, 129.99), 1);

    assert_eq!(first.total_cents(), second.total_cents());
    assert_eq!(first.total_cents(), 58_294);
    assert_eq!(first.lines()[0].id, 1);
    assert_eq!(second.lines()[0].id, 3);
}

#[test]
fn mutations_write_cart_and_timestamp_together() {
    let harness = Harness::new();
    let mut cart = harness.manager();
    cart.add_line(&product(1, 10.0), 1);

    let raw = harness.medium.get("cart").unwrap().unwrap();
    let stored: Vec<serde_json::Value> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(stored.len(), 1);
    for field in ["id", "name", "price", "category", "image", "description", "quantity"] {
        assert!(stored[0].get(field).is_some(), "missing {field}");
    }

    let stamp = harness.medium.get("cartTimestamp").unwrap().unwrap();
    assert_eq!(String::from_utf8(stamp).unwrap(), t0().timestamp_millis().to_string());
    assert_eq!(cart.last_modified(), Some(t0()));
}

#[test]
fn persisted_cart_round_trips_into_new_manager() {
    let harness = Harness::new();
    let expected: Vec<CartLine> = {
        let mut cart = harness.manager();
        cart.add_line(&product(5, 450.99), 1);
        cart.add_line(&product(8, 326.99), 2);
        cart.lines().to_vec()
    };

    let restored = harness.manager();
    assert_eq!(restored.lines(), expected.as_slice());
    assert_eq!(restored.last_modified(), Some(t0()));
}

#[test]
fn clear_twice_leaves_cart_empty_and_storage_clean() {
    let harness = Harness::new();
    let mut cart = harness.manager();
    cart.add_line(&product(1, 10.0), 1);

    cart.clear();
    assert!(cart.is_empty());
    cart.clear();
    assert!(cart.is_empty());
    assert!(!harness.medium.contains("cart"));
    assert!(!harness.medium.contains("cartTimestamp"));
    assert!(cart.last_modified().is_none());
}

#[test]
fn removing_last_line_drops_both_entries() {
    let harness = Harness::new();
    let mut cart = harness.manager();
    cart.add_line(&product(1, 10.0), 1);

    cart.remove_line(1);
    cart.remove_line(1);

    assert!(cart.is_empty());
    assert!(!harness.medium.contains("cart"));
    assert!(!harness.medium.contains("cartTimestamp"));
    assert_eq!(cart.reminder_state(), ReminderState::Idle);
}

#[test]
fn malformed_stored_cart_starts_empty() {
    let medium = Arc::new(MemoryStore::new());
    medium.set("cart", b"[{\"id\": \"oops\"").unwrap();
    medium.set("cartTimestamp", b"1700000000000").unwrap();

    let harness = Harness::with_medium(medium);
    let cart = harness.manager();

    assert!(cart.is_empty());
    assert!(!harness.medium.contains("cart"));
    assert!(!harness.medium.contains("cartTimestamp"));
}

#[test]
fn missing_timestamp_is_restamped_on_load() {
    let harness = Harness::new();
    {
        let mut cart = harness.manager();
        cart.add_line(&product(1, 10.0), 1);
    }
    harness.medium.remove("cartTimestamp").unwrap();
    harness.clock.advance(common::DAY);

    let cart = harness.manager();
    let expected = t0() + chrono::TimeDelta::days(1);
    assert_eq!(cart.last_modified(), Some(expected));
    assert!(harness.medium.contains("cartTimestamp"));
}

#[test]
fn unavailable_storage_keeps_cart_working_in_memory() {
    let harness = Harness::new();
    harness.medium.set_available(false);
    let mut cart = harness.manager();

    cart.add_line(&product(1, 10.0), 2);
    cart.add_line(&product(2, 5.0), 1);
    assert_eq!(cart.total(), 25.0);

    harness.medium.set_available(true);
    assert!(harness.medium.is_empty());
}

#[test]
fn quota_exceeded_is_not_fatal() {
    let harness = Harness::with_medium(Arc::new(MemoryStore::with_quota(8)));
    let mut cart = harness.manager();

    cart.add_line(&product(1, 10.0), 1);
    assert_eq!(cart.line_count(), 1);
    assert!(!harness.medium.contains("cart"));
}

#[test]
fn file_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new();
    let store = || PersistentStore::new(Arc::new(FileStore::new(dir.path())));

    {
        let mut cart = arturo_cart::services::cart_service::CartManager::load(
            harness.config.clone(),
            store(),
            harness.notifier.clone(),
            harness.clock.clone(),
        );
        cart.add_line(&product(2, 119.99), 3);
    }

    let cart = arturo_cart::services::cart_service::CartManager::load(
        harness.config.clone(),
        store(),
        harness.notifier.clone(),
        harness.clock.clone(),
    );
    assert_eq!(cart.line(2).map(|l| l.quantity), Some(3));
    assert!(dir.path().join("cart").exists());
    assert!(dir.path().join("cartTimestamp").exists());
}
