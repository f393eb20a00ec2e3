//! Basket change feed — typed notifications for UI subscribers.
//!
//! Every successful mutation on [`crate::GuestBasketManager`] emits one
//! event here, so page components re-render from the event instead of
//! polling storage. Watchers are plain closures; emission snapshots the
//! watcher list so a watcher may add or remove watchers from inside its
//! callback without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// What changed in the basket.
#[derive(Debug, Clone, PartialEq)]
pub enum BasketEvent {
    ItemAdded { record_id: i64, quantity: u32 },
    QuantityChanged { record_id: i64, quantity: u32 },
    ItemRemoved { record_id: i64 },
    Cleared,
    /// Emitted after transfer-on-login; lists the ids that reached the
    /// server-side basket.
    Transferred { record_ids: Vec<i64> },
}

/// Handle returned by [`ChangeFeed::watch`], used to unsubscribe.
pub type WatcherId = u64;

type WatcherFn = dyn Fn(&BasketEvent) + Send + Sync;

/// Subscriber list for [`BasketEvent`]s.
///
/// All methods take `&self`; the internal lock is never held while a
/// watcher callback runs.
#[derive(Default)]
pub struct ChangeFeed {
    watchers: Mutex<Vec<(WatcherId, Arc<WatcherFn>)>>,
    next_id: AtomicU64,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; returns an id for [`ChangeFeed::unwatch`].
    pub fn watch(&self, callback: impl Fn(&BasketEvent) + Send + Sync + 'static) -> WatcherId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.watchers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a watcher. Unknown ids are ignored.
    pub fn unwatch(&self, id: WatcherId) {
        self.watchers.lock().retain(|(wid, _)| *wid != id);
    }

    /// Deliver `event` to every watcher registered at the moment of the
    /// call. Watchers added during delivery see only later events.
    pub fn emit(&self, event: &BasketEvent) {
        let snapshot: Vec<Arc<WatcherFn>> = {
            let guard = self.watchers.lock();
            guard.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in snapshot {
            cb(event);
        }
    }

    /// Number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.lock().len()
    }
}
