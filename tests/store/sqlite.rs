use guest_basket::store::{KeyValueStore, SqliteStore};
use guest_basket::GuestBasketManager;

#[test]
fn set_get_remove_round_trip() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.get("guestBasket").unwrap(), None);

    store.set("guestBasket", r#"{"items":[]}"#).unwrap();
    assert_eq!(
        store.get("guestBasket").unwrap().as_deref(),
        Some(r#"{"items":[]}"#)
    );

    store.set("guestBasket", "updated").unwrap();
    assert_eq!(store.get("guestBasket").unwrap().as_deref(), Some("updated"));

    store.remove("guestBasket").unwrap();
    assert_eq!(store.get("guestBasket").unwrap(), None);
    // Removing an absent key is fine.
    store.remove("guestBasket").unwrap();
}

#[test]
fn keys_are_independent() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    store.remove("a").unwrap();
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn manager_persists_through_sqlite_backend() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mgr = GuestBasketManager::new(store);
    mgr.add_item(guest_basket::NewLineItem {
        record_id: 1,
        title: "Test Vinyl".to_string(),
        artist: "Test Artist".to_string(),
        price: 24.99,
        quantity: 1,
        available_stock: 10,
        condition: None,
        year: None,
    })
    .unwrap();

    let basket = mgr.load();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.total_amount, 24.99);
}
