use thiserror::Error;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Failures from a [`crate::store::KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Stored value under \"{key}\" could not be read")]
    Corrupt { key: String },

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

// ---------------------------------------------------------------------------
// BasketError
// ---------------------------------------------------------------------------

/// Policy violations raised by basket mutators.
///
/// Corrupt persisted state is deliberately absent here — `load()` recovers
/// from it silently and never surfaces it to the caller.
#[derive(Debug, Error)]
pub enum BasketError {
    #[error(
        "Not enough stock for record {record_id}: requested {requested}, \
         {available} available"
    )]
    OutOfStock {
        record_id: i64,
        requested: u32,
        available: u32,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// How a failed remote call should be treated by callers that retry.
/// The core itself never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Worth retrying later (network hiccup, 5xx).
    Transient,
    /// Retrying will not help (4xx, malformed response).
    Permanent,
}

/// Failure of a remote commerce API call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub kind: ApiErrorKind,
}

impl ApiError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ApiErrorKind::Transient,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ApiErrorKind::Permanent,
        }
    }
}

// ---------------------------------------------------------------------------
// TransferError
// ---------------------------------------------------------------------------

/// Raised by `transfer_to_account` only when rewriting the local basket
/// fails. Per-item API failures are collected in the `TransferReport`
/// instead — they never abort the transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// CheckoutError
// ---------------------------------------------------------------------------

/// Failures of checkout-session creation.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Basket is empty")]
    EmptyBasket,

    #[error("Coupon \"{code}\" is no longer valid")]
    CouponInvalid { code: String },

    #[error("Basket no longer matches the catalog ({} line(s) affected)", .0.len())]
    BasketStale(Vec<crate::types::LineDiscrepancy>),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Basket(#[from] BasketError),
}

// ---------------------------------------------------------------------------
// NotifyError
// ---------------------------------------------------------------------------

/// Failures of the push-notification channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("Notification hub already disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// Error — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Basket(#[from] BasketError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Convenience alias — the default error type is `Error`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
