//! GuestBasketManager tests — merge rules, stock bounds, persistence,
//! and recovery from corrupt local state.

use std::sync::Arc;

use parking_lot::Mutex;

use guest_basket::basket::{compute_total, BasketEvent, DEFAULT_BASKET_KEY};
use guest_basket::error::{BasketError, StoreError};
use guest_basket::store::{KeyValueStore, MemoryStore};
use guest_basket::{GuestBasketManager, NewLineItem};

fn vinyl(record_id: i64, price: f64, quantity: u32, stock: u32) -> NewLineItem {
    NewLineItem {
        record_id,
        title: "Test Vinyl".to_string(),
        artist: "Test Artist".to_string(),
        price,
        quantity,
        available_stock: stock,
        condition: Some("Mint".to_string()),
        year: Some(1977),
    }
}

fn manager() -> GuestBasketManager<Arc<MemoryStore>> {
    GuestBasketManager::new(Arc::new(MemoryStore::new()))
}

// --- add_item ---

#[test]
fn add_to_empty_basket() {
    let mgr = manager();
    let basket = mgr.add_item(vinyl(1, 24.99, 1, 10)).unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.items[0].quantity, 1);
    assert_eq!(basket.total_amount, 24.99);
}

#[test]
fn add_same_record_merges_quantities() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 24.99, 1, 10)).unwrap();
    let basket = mgr.add_item(vinyl(1, 24.99, 2, 10)).unwrap();
    assert_eq!(basket.items.len(), 1, "no duplicate line");
    assert_eq!(basket.items[0].quantity, 3);
    assert_eq!(basket.total_amount, 74.97);
}

#[test]
fn add_rejects_when_merged_quantity_exceeds_stock() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 24.99, 9, 10)).unwrap();
    let err = mgr.add_item(vinyl(1, 24.99, 5, 10)).unwrap_err();
    assert!(matches!(
        err,
        BasketError::OutOfStock {
            record_id: 1,
            requested: 14,
            available: 10
        }
    ));
    // Rejected in full: the existing line is untouched.
    let basket = mgr.load();
    assert_eq!(basket.items[0].quantity, 9);
}

#[test]
fn add_rejects_when_requested_quantity_alone_exceeds_stock() {
    let mgr = manager();
    let err = mgr.add_item(vinyl(1, 24.99, 4, 3)).unwrap_err();
    assert!(matches!(err, BasketError::OutOfStock { .. }));
    assert!(mgr.load().is_empty());
}

#[test]
fn add_rejects_zero_stock_before_any_mutation() {
    let mgr = manager();
    let err = mgr.add_item(vinyl(1, 24.99, 1, 0)).unwrap_err();
    assert!(matches!(err, BasketError::OutOfStock { available: 0, .. }));
    assert!(mgr.load().is_empty());
}

#[test]
fn add_rejects_zero_quantity_request() {
    let mgr = manager();
    let err = mgr.add_item(vinyl(1, 24.99, 0, 10)).unwrap_err();
    assert!(matches!(err, BasketError::OutOfStock { requested: 0, .. }));
    assert!(mgr.load().is_empty());
}

#[test]
fn new_records_append_in_insertion_order() {
    let mgr = manager();
    mgr.add_item(vinyl(3, 10.0, 1, 5)).unwrap();
    mgr.add_item(vinyl(1, 20.0, 1, 5)).unwrap();
    let basket = mgr.add_item(vinyl(2, 30.0, 1, 5)).unwrap();
    let order: Vec<i64> = basket.items.iter().map(|i| i.record_id).collect();
    assert_eq!(order, vec![3, 1, 2]);
}

#[test]
fn record_ids_stay_unique_across_add_sequences() {
    let mgr = manager();
    for _ in 0..4 {
        mgr.add_item(vinyl(7, 5.0, 1, 10)).unwrap();
        mgr.add_item(vinyl(8, 5.0, 1, 10)).unwrap();
    }
    let basket = mgr.load();
    assert_eq!(basket.items.len(), 2);
    assert!(basket.items.iter().all(|i| i.quantity == 4));
}

// --- update_quantity ---

#[test]
fn update_quantity_clamps_zero_to_one() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 10.0, 1, 5)).unwrap();
    let basket = mgr.update_quantity(1, 0).unwrap();
    assert_eq!(basket.items[0].quantity, 1, "floored, not removed");
    assert_eq!(basket.items.len(), 1);
}

#[test]
fn update_quantity_caps_at_stock_snapshot() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 10.0, 1, 5)).unwrap();
    let basket = mgr.update_quantity(1, 99).unwrap();
    assert_eq!(basket.items[0].quantity, 5);
    assert_eq!(basket.total_amount, 50.0);
}

#[test]
fn update_quantity_on_absent_record_is_noop() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 10.0, 2, 5)).unwrap();
    let basket = mgr.update_quantity(99, 3).unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.items[0].quantity, 2);
}

// --- remove_item ---

#[test]
fn remove_one_of_two_items() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 24.99, 1, 10)).unwrap();
    mgr.add_item(vinyl(2, 9.5, 2, 10)).unwrap();
    let basket = mgr.remove_item(1).unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.items[0].record_id, 2);
    assert_eq!(basket.total_amount, 19.0);
}

#[test]
fn removing_last_item_empties_basket() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 24.99, 1, 10)).unwrap();
    let basket = mgr.remove_item(1).unwrap();
    assert!(basket.items.is_empty());
    assert_eq!(basket.total_amount, 0.0);
}

#[test]
fn remove_absent_record_is_noop() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 24.99, 1, 10)).unwrap();
    let basket = mgr.remove_item(42).unwrap();
    assert_eq!(basket.items.len(), 1);
}

// --- clear ---

#[test]
fn clear_wipes_persisted_state_not_just_memory() {
    let store = Arc::new(MemoryStore::new());
    let mgr = GuestBasketManager::new(Arc::clone(&store));
    mgr.add_item(vinyl(1, 24.99, 1, 10)).unwrap();
    mgr.clear().unwrap();

    // A freshly constructed manager over the same store sees nothing.
    let fresh = GuestBasketManager::new(Arc::clone(&store));
    assert!(fresh.load().is_empty());
    assert_eq!(store.get(DEFAULT_BASKET_KEY).unwrap(), None);
}

// --- load ---

#[test]
fn load_recovers_from_malformed_json() {
    let store = Arc::new(MemoryStore::new());
    store.seed(DEFAULT_BASKET_KEY, "{not json!!");
    let mgr = GuestBasketManager::new(store);
    let basket = mgr.load();
    assert!(basket.items.is_empty());
    assert_eq!(basket.total_amount, 0.0);
}

#[test]
fn load_ignores_persisted_total_and_recomputes() {
    let store = Arc::new(MemoryStore::new());
    store.seed(
        DEFAULT_BASKET_KEY,
        r#"{"items":[{"recordId":1,"title":"T","artist":"A","price":10.0,"quantity":2,"availableStock":5}],"totalAmount":999.0}"#,
    );
    let mgr = GuestBasketManager::new(store);
    assert_eq!(mgr.load().total_amount, 20.0);
}

#[test]
fn load_drops_unreadable_lines_and_keeps_the_rest() {
    let store = Arc::new(MemoryStore::new());
    store.seed(
        DEFAULT_BASKET_KEY,
        r#"{"items":[
            {"recordId":1,"title":"T","artist":"A","price":10.0,"quantity":1,"availableStock":5},
            {"title":"no id","price":5.0,"quantity":1,"availableStock":5},
            {"recordId":2,"price":"4.50","quantity":"2","availableStock":"9"}
        ],"totalAmount":0}"#,
    );
    let mgr = GuestBasketManager::new(store);
    let basket = mgr.load();
    assert_eq!(basket.items.len(), 2);
    assert_eq!(basket.items[1].record_id, 2);
    assert_eq!(basket.total_amount, 19.0);
}

#[test]
fn load_survives_a_failing_store() {
    struct BrokenStore;
    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io("quota exceeded".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io("quota exceeded".to_string()))
        }
    }

    let mgr = GuestBasketManager::new(BrokenStore);
    assert!(mgr.load().is_empty(), "corruption never blocks browsing");
}

// --- totals ---

#[test]
fn total_is_pure_function_of_items_after_every_mutator() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 24.99, 2, 10)).unwrap();
    mgr.add_item(vinyl(2, 3.33, 3, 10)).unwrap();
    mgr.update_quantity(1, 3).unwrap();
    let basket = mgr.remove_item(2).unwrap();
    assert_eq!(basket.total_amount, compute_total(&basket.items));
    assert_eq!(basket.total_amount, 74.97);
}

#[test]
fn total_rounds_to_cents() {
    // 3 * 0.1 = 0.30000000000000004 in raw f64
    let items = vec![
        guest_basket::BasketLineItem {
            record_id: 1,
            title: String::new(),
            artist: String::new(),
            price: 0.1,
            quantity: 3,
            available_stock: 10,
            condition: None,
            year: None,
        },
    ];
    assert_eq!(compute_total(&items), 0.3);
}

// --- change feed ---

#[test]
fn mutators_emit_change_events() {
    let mgr = manager();
    let seen: Arc<Mutex<Vec<BasketEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    mgr.watch(move |event| sink.lock().push(event.clone()));

    mgr.add_item(vinyl(1, 10.0, 1, 5)).unwrap();
    mgr.update_quantity(1, 2).unwrap();
    mgr.remove_item(1).unwrap();
    mgr.clear().unwrap();

    let events = seen.lock();
    assert_eq!(
        *events,
        vec![
            BasketEvent::ItemAdded {
                record_id: 1,
                quantity: 1
            },
            BasketEvent::QuantityChanged {
                record_id: 1,
                quantity: 2
            },
            BasketEvent::ItemRemoved { record_id: 1 },
            BasketEvent::Cleared,
        ]
    );
}

#[test]
fn rejected_add_emits_nothing() {
    let mgr = manager();
    let seen: Arc<Mutex<Vec<BasketEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    mgr.watch(move |event| sink.lock().push(event.clone()));

    let _ = mgr.add_item(vinyl(1, 10.0, 2, 1));
    assert!(seen.lock().is_empty());
}

#[test]
fn noop_update_emits_nothing() {
    let mgr = manager();
    mgr.add_item(vinyl(1, 10.0, 2, 5)).unwrap();

    let seen: Arc<Mutex<Vec<BasketEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    mgr.watch(move |event| sink.lock().push(event.clone()));

    mgr.update_quantity(1, 2).unwrap(); // unchanged quantity
    mgr.update_quantity(99, 1).unwrap(); // absent record
    assert!(seen.lock().is_empty());
}
