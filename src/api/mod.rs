//! CommerceApi — the typed seam to the remote commerce service.
//!
//! The core treats the service as a black box behind this trait: catalog
//! lookups, the server-side basket, coupon validation, and the payment
//! session endpoints. Tests substitute mock implementations; the `http`
//! feature provides a reqwest-backed one.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{CheckoutSession, CheckoutSessionRequest, RecordDetail};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpCommerceApi;

/// Async client for the remote commerce API.
///
/// Every method maps to one endpoint. Failures are [`ApiError`]s with a
/// `Transient`/`Permanent` kind; the core never retries — retry policy
/// belongs to the caller.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// `GET /records/{id}` — current catalog state of one record.
    async fn fetch_record(&self, record_id: i64) -> Result<RecordDetail, ApiError>;

    /// `POST /basket/add` — add one line to an account's server-side
    /// basket. Used exclusively by transfer-on-login.
    async fn add_to_basket(
        &self,
        user_id: i64,
        record_id: i64,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// `GET /coupons/validate/{code}` — server-side coupon validity.
    async fn validate_coupon(&self, code: &str) -> Result<bool, ApiError>;

    /// `POST /api/payment/create-checkout-session` — returns the payment
    /// provider handle for the hosted checkout UI.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ApiError>;

    /// `POST /api/payment/verify-session/{id}` — confirm a completed
    /// payment.
    async fn verify_session(&self, session_id: &str) -> Result<(), ApiError>;
}
