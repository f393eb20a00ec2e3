use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Basket shapes
// ---------------------------------------------------------------------------

/// One basket entry for a catalog record, with an aggregated quantity.
///
/// `title`, `artist`, `price`, and `available_stock` are snapshots captured
/// at add time. They are display/bounds data only — checkout re-validates
/// against the live catalog before charging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketLineItem {
    pub record_id: i64,
    pub title: String,
    pub artist: String,
    /// Unit price in major units (euros).
    pub price: f64,
    pub quantity: u32,
    /// Stock snapshot at add time; client-side bound only, not authoritative.
    pub available_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl BasketLineItem {
    /// Line total: `price * quantity`, unrounded.
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// The persisted basket document: `{"items": [...], "totalAmount": n}`.
///
/// `total_amount` is derived — always `sum(price * quantity)` over `items`,
/// rounded to cents. It is recomputed after every mutation and on load;
/// the persisted value is never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub items: Vec<BasketLineItem>,
    pub total_amount: f64,
}

impl Basket {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_amount: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by its identity key.
    pub fn line(&self, record_id: i64) -> Option<&BasketLineItem> {
        self.items.iter().find(|item| item.record_id == record_id)
    }
}

impl Default for Basket {
    fn default() -> Self {
        Self::empty()
    }
}

/// Input to `add_item` — the shape a product page assembles from a
/// [`RecordDetail`] plus the visitor's chosen quantity.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub record_id: i64,
    pub title: String,
    pub artist: String,
    pub price: f64,
    pub quantity: u32,
    pub available_stock: u32,
    pub condition: Option<String>,
    pub year: Option<i32>,
}

impl NewLineItem {
    /// Build an add request from a catalog record and a chosen quantity.
    pub fn from_record(record: &RecordDetail, quantity: u32) -> Self {
        Self {
            record_id: record.id,
            title: record.title.clone(),
            artist: record.artist.clone(),
            price: record.price,
            quantity,
            available_stock: record.quantity,
            condition: record.condition.clone(),
            year: record.year,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog shapes
// ---------------------------------------------------------------------------

/// Record detail as returned by `GET /records/{id}`.
///
/// `quantity` is the current stock level (the API reuses the field name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub price: f64,
    /// Current stock.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
}

// ---------------------------------------------------------------------------
// Coupon
// ---------------------------------------------------------------------------

/// A server-issued discount code. Applied at checkout projection time only
/// after re-validation against the API — UI state is never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub coupon_code: String,
    pub discount_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_used: bool,
}

impl Coupon {
    /// Locally knowable validity: unused and not past its window.
    /// The server-side check can still fail (consumed elsewhere), so this
    /// is a cheap pre-filter, not the authority.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.valid_until.map_or(true, |until| until >= now)
    }
}

// ---------------------------------------------------------------------------
// Transfer shapes
// ---------------------------------------------------------------------------

/// One line that failed to reach the server-side basket.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFailure {
    pub record_id: i64,
    pub message: String,
}

/// Outcome of `transfer_to_account`. Per-item failures land here rather
/// than aborting the transfer; login completion is never blocked on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    /// Record ids transferred to the server basket, in basket order.
    pub transferred: Vec<i64>,
    /// Lines kept locally for retry on a later login.
    pub failed: Vec<TransferFailure>,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Checkout shapes
// ---------------------------------------------------------------------------

/// One payment-provider-facing line, projected from a basket line.
/// Prices are passed in major units; the provider handles currency
/// formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineItem {
    pub record_id: i64,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub price: f64,
    pub quantity: u32,
}

/// Pure projection of a basket (plus optional coupon) for checkout display
/// and session creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutProjection {
    pub line_items: Vec<CheckoutLineItem>,
    /// Basket total after the coupon discount, rounded to cents.
    pub grand_total: f64,
}

/// Who is checking out.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutIdentity {
    User { user_id: i64 },
    Guest,
}

/// Contact and shipping details collected from an unauthenticated visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub phonenum: String,
}

/// Metadata block sent with a checkout session request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMetadata {
    /// Stringified user id, or `None` for guests (serialized as null).
    pub user_id: Option<String>,
    pub is_guest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// Coupon block sent with a checkout session request. `is_valid` carries
/// the result of the re-validation performed at projection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCoupon {
    pub code: String,
    pub discount_percentage: f64,
    pub is_valid: bool,
}

/// Body of `POST /api/payment/create-checkout-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub items: Vec<CheckoutLineItem>,
    pub metadata: CheckoutMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CheckoutCoupon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_details: Option<GuestDetails>,
}

/// Provider handle returned by session creation. The core forwards it to
/// the payment provider's hosted UI without interpreting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalog re-validation
// ---------------------------------------------------------------------------

/// How a basket line's snapshot disagrees with the live catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscrepancyKind {
    /// The record no longer exists (or the lookup permanently failed).
    NoLongerAvailable,
    /// Current stock cannot cover the basket quantity.
    InsufficientStock { requested: u32, available: u32 },
    /// Unit price moved since the line was added.
    PriceChanged { snapshot: f64, current: f64 },
}

/// One stale basket line found during checkout re-validation.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDiscrepancy {
    pub record_id: i64,
    pub kind: DiscrepancyKind,
}
