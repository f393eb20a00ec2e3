//! Transfer-on-login: move the guest basket into a server-side basket.
//!
//! Called once, immediately after a successful login or registration.
//! One `POST /basket/add` per line, issued sequentially in basket order so
//! the server observes additions in the order the visitor accumulated
//! them. Best-effort: a failed line is logged and skipped, the rest still
//! transfer.
//!
//! Partial-failure policy: lines that reached the server are removed from
//! the local basket; failed lines stay persisted for retry on a later
//! login. The storage key is removed outright only when every line
//! transferred.

use crate::api::CommerceApi;
use crate::basket::{BasketEvent, GuestBasketManager};
use crate::error::TransferError;
use crate::store::KeyValueStore;
use crate::types::{TransferFailure, TransferReport};

impl<S: KeyValueStore> GuestBasketManager<S> {
    /// Transfer the guest basket into `user_id`'s server-side basket.
    ///
    /// Per-item API failures never abort the transfer and never surface
    /// as `Err` — they are collected in the report so the caller may show
    /// a non-blocking notice. Only a failure to rewrite local storage
    /// afterwards returns an error.
    pub async fn transfer_to_account(
        &self,
        user_id: i64,
        api: &dyn CommerceApi,
    ) -> Result<TransferReport, TransferError> {
        let basket = self.load();
        if basket.is_empty() {
            return Ok(TransferReport::default());
        }

        let mut report = TransferReport::default();
        let mut kept = Vec::new();

        for item in basket.items {
            match api
                .add_to_basket(user_id, item.record_id, item.quantity)
                .await
            {
                Ok(()) => report.transferred.push(item.record_id),
                Err(e) => {
                    tracing::warn!(
                        record_id = item.record_id,
                        error = %e,
                        "basket line failed to transfer, keeping locally"
                    );
                    report.failed.push(TransferFailure {
                        record_id: item.record_id,
                        message: e.message,
                    });
                    kept.push(item);
                }
            }
        }

        if kept.is_empty() {
            self.remove_key()?;
        } else {
            self.persist(kept)?;
        }

        if !report.transferred.is_empty() {
            self.emit(&BasketEvent::Transferred {
                record_ids: report.transferred.clone(),
            });
        }

        Ok(report)
    }
}
