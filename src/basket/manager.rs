//! GuestBasketManager — the single owner of the persisted guest basket.
//!
//! All reads and writes of the basket storage key go through this type;
//! page components call its operations exclusively. Mutators follow a
//! load → check → mutate → recompute-total → persist sequence, so the
//! persisted document is always internally consistent.
//!
//! Two managers over the same store (two tabs) are last-write-wins: a
//! mutation loads, edits, and rewrites the whole document with no
//! cross-instance guard. Accepted limitation — guarding it would change
//! observable behavior.

use serde_json::Value;

use crate::error::{BasketError, StoreError};
use crate::store::KeyValueStore;
use crate::types::{Basket, BasketLineItem, NewLineItem};

use super::events::{BasketEvent, ChangeFeed, WatcherId};
use super::normalize::normalize_document;

/// Storage key of the persisted guest basket.
pub const DEFAULT_BASKET_KEY: &str = "guestBasket";

/// Round a currency amount to cents.
pub(crate) fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Pure basket total: `sum(price * quantity)` rounded to cents.
///
/// Every mutator recomputes through this, and checkout/summary views call
/// it directly, so displayed totals can never diverge from basket logic.
pub fn compute_total(items: &[BasketLineItem]) -> f64 {
    round_to_cents(items.iter().map(BasketLineItem::line_total).sum())
}

/// Owner of the unauthenticated visitor's basket.
pub struct GuestBasketManager<S: KeyValueStore> {
    store: S,
    key: String,
    feed: ChangeFeed,
}

impl<S: KeyValueStore> GuestBasketManager<S> {
    /// Create a manager over `store` using [`DEFAULT_BASKET_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_BASKET_KEY)
    }

    /// Create a manager with a custom storage key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            feed: ChangeFeed::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Change feed
    // -----------------------------------------------------------------------

    /// Subscribe to basket change events.
    pub fn watch(&self, callback: impl Fn(&BasketEvent) + Send + Sync + 'static) -> WatcherId {
        self.feed.watch(callback)
    }

    /// Unsubscribe a watcher registered via [`GuestBasketManager::watch`].
    pub fn unwatch(&self, id: WatcherId) {
        self.feed.unwatch(id)
    }

    pub(crate) fn emit(&self, event: &BasketEvent) {
        self.feed.emit(event)
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Read and normalize the persisted basket.
    ///
    /// Never fails: a missing key, unreadable storage, malformed JSON, or
    /// an unexpected document shape all yield an empty basket. Corruption
    /// must never block browsing. The total is recomputed from the
    /// surviving lines, not read from storage.
    pub fn load(&self) -> Basket {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Basket::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "basket storage unreadable, starting empty");
                return Basket::empty();
            }
        };

        let doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "persisted basket is not valid JSON, resetting");
                return Basket::empty();
            }
        };

        let items = normalize_document(&doc);
        let total_amount = compute_total(&items);
        Basket {
            items,
            total_amount,
        }
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Add a line, merging quantities when the record is already present.
    ///
    /// All-or-nothing: if the requested quantity (alone, or combined with
    /// an existing line) exceeds the stock snapshot, nothing changes and
    /// `OutOfStock` is returned. There is no clamping and no partial
    /// fulfillment here — that is `update_quantity`'s contract.
    pub fn add_item(&self, new: NewLineItem) -> Result<Basket, BasketError> {
        let record_id = new.record_id;
        // Requested quantity must land in [1, stock] on its own.
        if new.quantity < 1 || new.available_stock < 1 || new.quantity > new.available_stock {
            return Err(BasketError::OutOfStock {
                record_id,
                requested: new.quantity,
                available: new.available_stock,
            });
        }

        let mut basket = self.load();

        let quantity = match basket
            .items
            .iter_mut()
            .find(|item| item.record_id == record_id)
        {
            Some(existing) => {
                let merged = existing.quantity + new.quantity;
                if merged > existing.available_stock {
                    return Err(BasketError::OutOfStock {
                        record_id,
                        requested: merged,
                        available: existing.available_stock,
                    });
                }
                existing.quantity = merged;
                merged
            }
            None => {
                let quantity = new.quantity;
                basket.items.push(BasketLineItem {
                    record_id,
                    title: new.title,
                    artist: new.artist,
                    price: new.price,
                    quantity,
                    available_stock: new.available_stock,
                    condition: new.condition,
                    year: new.year,
                });
                quantity
            }
        };

        let basket = self.persist(basket.items)?;
        self.emit(&BasketEvent::ItemAdded {
            record_id,
            quantity,
        });
        Ok(basket)
    }

    /// Set a line's quantity, clamped into `[1, available_stock]`.
    ///
    /// Backs the +/- stepper: values below 1 floor to 1 (never remove),
    /// values above the stock snapshot cap at it. No-op when the record
    /// is not in the basket.
    pub fn update_quantity(&self, record_id: i64, new_quantity: u32) -> Result<Basket, BasketError> {
        let mut basket = self.load();

        let Some(item) = basket
            .items
            .iter_mut()
            .find(|item| item.record_id == record_id)
        else {
            return Ok(basket);
        };

        let clamped = new_quantity.max(1).min(item.available_stock);
        if clamped == item.quantity {
            return Ok(basket);
        }
        item.quantity = clamped;

        let basket = self.persist(basket.items)?;
        self.emit(&BasketEvent::QuantityChanged {
            record_id,
            quantity: clamped,
        });
        Ok(basket)
    }

    /// Delete a line. No-op when the record is not in the basket.
    pub fn remove_item(&self, record_id: i64) -> Result<Basket, BasketError> {
        let mut basket = self.load();
        let before = basket.items.len();
        basket.items.retain(|item| item.record_id != record_id);
        if basket.items.len() == before {
            return Ok(basket);
        }

        let basket = self.persist(basket.items)?;
        self.emit(&BasketEvent::ItemRemoved { record_id });
        Ok(basket)
    }

    /// Wipe the basket, removing the persisted key entirely.
    ///
    /// A fresh manager over the same store subsequently loads an empty
    /// basket.
    pub fn clear(&self) -> Result<Basket, BasketError> {
        self.store.remove(&self.key).map_err(BasketError::Store)?;
        self.emit(&BasketEvent::Cleared);
        Ok(Basket::empty())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Recompute the total and write the full document.
    pub(crate) fn persist(&self, items: Vec<BasketLineItem>) -> Result<Basket, StoreError> {
        let basket = Basket {
            total_amount: compute_total(&items),
            items,
        };
        // Shape types serialize infallibly; map_err keeps the seam honest.
        let raw = serde_json::to_string(&basket)
            .map_err(|e| StoreError::Io(format!("serialize basket: {e}")))?;
        self.store.set(&self.key, &raw)?;
        tracing::debug!(lines = basket.items.len(), total = basket.total_amount, "basket persisted");
        Ok(basket)
    }

    pub(crate) fn remove_key(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }
}
