//! Load-time normalization of the persisted basket document.
//!
//! The persisted basket is a non-critical cache: anything that cannot be
//! coerced into a well-formed line is dropped with a warning, never an
//! error. Numeric fields arrive as JSON numbers or numeric strings
//! (historical writers were inconsistent), so both are accepted.

use serde_json::Value;

use crate::types::BasketLineItem;

/// Coerce a JSON value into an integer: numbers directly, strings via
/// parse. Fractional numbers truncate. `None` for everything else.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value into a float: numbers directly, strings via parse.
/// Non-numeric values coerce to 0.0, matching the cache's lenient policy.
fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce a quantity-like field. Missing or non-numeric values become 0,
/// which the caller treats as "drop this line".
fn coerce_quantity(obj: &serde_json::Map<String, Value>, field: &str) -> u32 {
    obj.get(field)
        .and_then(coerce_i64)
        .filter(|n| *n >= 0)
        .map(|n| n.min(u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Normalize one raw line from the persisted document.
///
/// Returns `None` when the line cannot satisfy the basket invariants:
/// missing or invalid `recordId`, quantity below 1, stock snapshot below 1,
/// or a negative price. A quantity above the stock snapshot is clamped
/// down rather than dropped — the data is salvageable.
pub fn normalize_line(raw: &Value) -> Option<BasketLineItem> {
    let obj = raw.as_object()?;

    let record_id = obj.get("recordId").and_then(coerce_i64)?;
    let quantity = coerce_quantity(obj, "quantity");
    let available_stock = coerce_quantity(obj, "availableStock");
    let price = obj.get("price").map(coerce_f64).unwrap_or(0.0);

    if quantity < 1 || available_stock < 1 || price < 0.0 || !price.is_finite() {
        return None;
    }

    let str_field = |field: &str| -> String {
        obj.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(BasketLineItem {
        record_id,
        title: str_field("title"),
        artist: str_field("artist"),
        price,
        quantity: quantity.min(available_stock),
        available_stock,
        condition: obj
            .get("condition")
            .and_then(Value::as_str)
            .map(str::to_string),
        year: obj.get("year").and_then(coerce_i64).map(|y| y as i32),
    })
}

/// Normalize the whole persisted document into a list of valid lines.
///
/// Accepts only the `{"items": [...]}` shape; anything else yields an
/// empty list. The persisted `totalAmount` is ignored — totals are always
/// recomputed. Duplicate `recordId`s (which only a corrupt writer could
/// produce) are merged into the first occurrence, capped at its stock
/// snapshot, preserving the uniqueness invariant.
pub fn normalize_document(doc: &Value) -> Vec<BasketLineItem> {
    let raw_items = match doc.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };

    let mut lines: Vec<BasketLineItem> = Vec::with_capacity(raw_items.len());
    for (idx, raw) in raw_items.iter().enumerate() {
        let Some(line) = normalize_line(raw) else {
            tracing::warn!(index = idx, "dropping unreadable basket line");
            continue;
        };
        match lines.iter_mut().find(|l| l.record_id == line.record_id) {
            Some(existing) => {
                existing.quantity =
                    (existing.quantity + line.quantity).min(existing.available_stock);
            }
            None => lines.push(line),
        }
    }
    lines
}
