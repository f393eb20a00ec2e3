//! ChangeFeed tests — snapshot-on-emit subscriber semantics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use guest_basket::basket::{BasketEvent, ChangeFeed};

#[test]
fn watch_and_unwatch() {
    let feed = ChangeFeed::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let id = feed.watch(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(feed.watcher_count(), 1);

    feed.emit(&BasketEvent::Cleared);
    feed.unwatch(id);
    feed.emit(&BasketEvent::Cleared);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(feed.watcher_count(), 0);
}

#[test]
fn unwatch_unknown_id_is_ignored() {
    let feed = ChangeFeed::new();
    feed.unwatch(12345);
    assert_eq!(feed.watcher_count(), 0);
}

#[test]
fn watcher_added_during_emit_misses_current_round() {
    let feed = Arc::new(ChangeFeed::new());
    let late_hits = Arc::new(AtomicUsize::new(0));

    let feed_inner = Arc::clone(&feed);
    let late_inner = Arc::clone(&late_hits);
    feed.watch(move |_| {
        let counter = Arc::clone(&late_inner);
        feed_inner.watch(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    });

    feed.emit(&BasketEvent::Cleared);
    assert_eq!(late_hits.load(Ordering::SeqCst), 0, "snapshot-on-emit");

    feed.emit(&BasketEvent::Cleared);
    assert!(late_hits.load(Ordering::SeqCst) >= 1);
}

#[test]
fn events_carry_payload() {
    let feed = ChangeFeed::new();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    feed.watch(move |event| sink.lock().push(event.clone()));

    feed.emit(&BasketEvent::ItemAdded {
        record_id: 5,
        quantity: 2,
    });
    feed.emit(&BasketEvent::Transferred {
        record_ids: vec![5, 6],
    });

    let events = seen.lock();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        BasketEvent::Transferred {
            record_ids: vec![5, 6]
        }
    );
}
