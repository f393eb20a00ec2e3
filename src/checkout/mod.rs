//! Checkout projection and session flow.
//!
//! `project_for_checkout` is the pure half: basket lines to payment-
//! provider line items plus the discounted grand total. `CheckoutFlow`
//! is the effectful half: it re-validates the coupon and the line
//! snapshots against the live API before asking for a session, because
//! coupons expire and snapshots drift between add time and checkout.

use std::sync::Arc;

use chrono::Utc;

use crate::api::CommerceApi;
use crate::basket::manager::{compute_total, round_to_cents};
use crate::basket::GuestBasketManager;
use crate::error::{ApiErrorKind, CheckoutError};
use crate::store::KeyValueStore;
use crate::types::{
    Basket, BasketLineItem, CheckoutCoupon, CheckoutIdentity, CheckoutLineItem, CheckoutMetadata,
    CheckoutProjection, CheckoutSession, CheckoutSessionRequest, Coupon, DiscrepancyKind,
    GuestDetails, LineDiscrepancy,
};

/// Two prices agree when they land on the same cent.
fn same_price(a: f64, b: f64) -> bool {
    (a * 100.0).round() == (b * 100.0).round()
}

/// Project basket lines (plus an optional, already-validated coupon) into
/// payment-provider line items and the discounted grand total.
///
/// Pure and side-effect-free: no I/O, no basket mutation. Prices stay in
/// major units; the provider handles currency formatting. Callers that
/// hold an unvalidated coupon must go through [`CheckoutFlow`] instead.
pub fn project_for_checkout(
    items: &[BasketLineItem],
    coupon: Option<&Coupon>,
) -> CheckoutProjection {
    let line_items = items
        .iter()
        .map(|item| CheckoutLineItem {
            record_id: item.record_id,
            title: item.title.clone(),
            artist: item.artist.clone(),
            condition: item.condition.clone(),
            price: item.price,
            quantity: item.quantity,
        })
        .collect();

    let subtotal = compute_total(items);
    let grand_total = match coupon {
        Some(c) => round_to_cents(subtotal - subtotal * c.discount_percentage / 100.0),
        None => subtotal,
    };

    CheckoutProjection {
        line_items,
        grand_total,
    }
}

/// Effectful checkout orchestration over a [`CommerceApi`].
pub struct CheckoutFlow {
    api: Arc<dyn CommerceApi>,
}

impl CheckoutFlow {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self { api }
    }

    /// Compare every basket line against the live catalog.
    ///
    /// Returns one [`LineDiscrepancy`] per stale line: vanished record,
    /// stock below the basket quantity, or price drift. A transient
    /// lookup failure propagates as an error (the caller should retry);
    /// a permanent one marks the line as no longer available.
    pub async fn revalidate_lines(
        &self,
        items: &[BasketLineItem],
    ) -> Result<Vec<LineDiscrepancy>, CheckoutError> {
        let mut discrepancies = Vec::new();

        for item in items {
            let record = match self.api.fetch_record(item.record_id).await {
                Ok(record) => record,
                Err(e) if e.kind == ApiErrorKind::Permanent => {
                    discrepancies.push(LineDiscrepancy {
                        record_id: item.record_id,
                        kind: DiscrepancyKind::NoLongerAvailable,
                    });
                    continue;
                }
                Err(e) => return Err(CheckoutError::Api(e)),
            };

            if record.quantity < item.quantity {
                discrepancies.push(LineDiscrepancy {
                    record_id: item.record_id,
                    kind: DiscrepancyKind::InsufficientStock {
                        requested: item.quantity,
                        available: record.quantity,
                    },
                });
            } else if !same_price(record.price, item.price) {
                discrepancies.push(LineDiscrepancy {
                    record_id: item.record_id,
                    kind: DiscrepancyKind::PriceChanged {
                        snapshot: item.price,
                        current: record.price,
                    },
                });
            }
        }

        Ok(discrepancies)
    }

    /// Create a payment session for the basket.
    ///
    /// Rejects an empty basket, a coupon the API no longer accepts
    /// (`CouponInvalid` — the total never silently changes), and any
    /// snapshot drift found by [`CheckoutFlow::revalidate_lines`]
    /// (`BasketStale` with the full discrepancy list, so the UI can ask
    /// the visitor to reconcile). On success the provider handle is
    /// returned unchanged.
    pub async fn create_session(
        &self,
        basket: &Basket,
        coupon: Option<&Coupon>,
        identity: &CheckoutIdentity,
        guest_details: Option<GuestDetails>,
    ) -> Result<CheckoutSession, CheckoutError> {
        if basket.is_empty() {
            return Err(CheckoutError::EmptyBasket);
        }

        let validated = match coupon {
            Some(c) => {
                let active_locally = c.is_active(Utc::now());
                let active_remotely = active_locally
                    && self.api.validate_coupon(&c.coupon_code).await?;
                if !active_remotely {
                    return Err(CheckoutError::CouponInvalid {
                        code: c.coupon_code.clone(),
                    });
                }
                Some(c)
            }
            None => None,
        };

        let discrepancies = self.revalidate_lines(&basket.items).await?;
        if !discrepancies.is_empty() {
            return Err(CheckoutError::BasketStale(discrepancies));
        }

        let projection = project_for_checkout(&basket.items, validated);
        tracing::debug!(
            lines = projection.line_items.len(),
            grand_total = projection.grand_total,
            "creating checkout session"
        );

        let request = CheckoutSessionRequest {
            items: projection.line_items,
            metadata: CheckoutMetadata {
                user_id: match identity {
                    CheckoutIdentity::User { user_id } => Some(user_id.to_string()),
                    CheckoutIdentity::Guest => None,
                },
                is_guest: matches!(identity, CheckoutIdentity::Guest),
                coupon_code: validated.map(|c| c.coupon_code.clone()),
            },
            coupon: validated.map(|c| CheckoutCoupon {
                code: c.coupon_code.clone(),
                discount_percentage: c.discount_percentage,
                is_valid: true,
            }),
            guest_details,
        };

        Ok(self.api.create_checkout_session(&request).await?)
    }

    /// Confirm a completed payment and destroy the guest basket.
    ///
    /// Verification failure leaves the basket untouched so the visitor
    /// can retry from the basket page.
    pub async fn confirm_completion<S: KeyValueStore>(
        &self,
        manager: &GuestBasketManager<S>,
        session_id: &str,
    ) -> Result<(), CheckoutError> {
        self.api.verify_session(session_id).await?;
        manager.clear()?;
        Ok(())
    }
}
