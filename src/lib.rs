pub mod error;
pub mod types;

pub mod api;
pub mod basket;
pub mod checkout;
pub mod notify;
pub mod store;
pub mod transfer;

pub use basket::GuestBasketManager;
pub use error::{Error, Result};
pub use types::{Basket, BasketLineItem, NewLineItem};
