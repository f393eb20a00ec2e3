//! reqwest-backed `CommerceApi` implementation.
//!
//! JSON in, JSON out, camelCase payload fields. 5xx and connection errors
//! map to transient [`ApiError`]s, 4xx and malformed responses to
//! permanent ones.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ApiError;
use crate::types::{CheckoutSession, CheckoutSessionRequest, RecordDetail};

use super::CommerceApi;

/// HTTP client for the commerce API at a fixed base URL.
pub struct HttpCommerceApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToBasketRequest {
    user_id: i64,
    record_id: i64,
    quantity: u32,
}

impl HttpCommerceApi {
    /// Create a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client` (connection
    /// pooling, custom timeouts).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a transport-level failure. Timeouts and connection errors are
    /// transient; everything else (builder misuse, redirect loops) is not.
    fn transport_err(e: reqwest::Error) -> ApiError {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            ApiError::transient(e.to_string())
        } else {
            ApiError::permanent(e.to_string())
        }
    }

    /// Map a non-success status to an error kind.
    fn status_err(status: reqwest::StatusCode, context: &str) -> ApiError {
        let message = format!("{context}: HTTP {status}");
        if status.is_server_error() {
            ApiError::transient(message)
        } else {
            ApiError::permanent(message)
        }
    }
}

#[async_trait]
impl CommerceApi for HttpCommerceApi {
    async fn fetch_record(&self, record_id: i64) -> Result<RecordDetail, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/records/{record_id}")))
            .send()
            .await
            .map_err(Self::transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_err(status, "fetch record"));
        }
        response
            .json::<RecordDetail>()
            .await
            .map_err(|e| ApiError::permanent(format!("fetch record: {e}")))
    }

    async fn add_to_basket(
        &self,
        user_id: i64,
        record_id: i64,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/basket/add"))
            .json(&AddToBasketRequest {
                user_id,
                record_id,
                quantity,
            })
            .send()
            .await
            .map_err(Self::transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_err(status, "add to basket"));
        }
        Ok(())
    }

    async fn validate_coupon(&self, code: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/coupons/validate/{code}")))
            .send()
            .await
            .map_err(Self::transport_err)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Self::status_err(status, "validate coupon"));
        }
        // The endpoint answers validity with its status code.
        Ok(status.is_success())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ApiError> {
        let response = self
            .client
            .post(self.url("/api/payment/create-checkout-session"))
            .json(request)
            .send()
            .await
            .map_err(Self::transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_err(status, "create checkout session"));
        }
        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| ApiError::permanent(format!("create checkout session: {e}")))
    }

    async fn verify_session(&self, session_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/payment/verify-session/{session_id}")))
            .send()
            .await
            .map_err(Self::transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_err(status, "verify session"));
        }
        Ok(())
    }
}
