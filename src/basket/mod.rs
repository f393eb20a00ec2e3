pub mod events;
pub mod manager;
pub mod normalize;

pub use events::{BasketEvent, ChangeFeed, WatcherId};
pub use manager::{compute_total, GuestBasketManager, DEFAULT_BASKET_KEY};
