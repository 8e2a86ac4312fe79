//! Stock reconciliation: backorder math for a requested quantity against
//! the stock known to the client.
//!
//! Reconciliation is advisory and display-only. It never blocks adding to
//! cart or submitting an order: the business sells into backorder ("por
//! encargue") and coordinates fulfillment manually afterwards.

use serde::{Deserialize, Serialize};

/// How much of a requested quantity is immediately available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReconciliation {
    /// True when known stock is exhausted or the request exceeds it.
    pub is_backorder: bool,
    /// Units fulfillable from known stock.
    pub available_now: u32,
    /// Units to be procured ("por encargue").
    pub backordered_qty: u32,
}

/// Reconcile a requested quantity against known stock.
///
/// Policy: the line is a backorder when `known_stock <= 0` or when the
/// request exceeds it. With no stock at all, the entire request is
/// backordered; otherwise up to `known_stock` units are available now and
/// the remainder is backordered.
#[must_use]
pub fn reconcile(quantity: u32, known_stock: i64) -> StockReconciliation {
    let available_now = if known_stock <= 0 {
        0
    } else {
        quantity.min(u32::try_from(known_stock).unwrap_or(u32::MAX))
    };

    StockReconciliation {
        is_backorder: known_stock <= 0 || i64::from(quantity) > known_stock,
        available_now,
        backordered_qty: quantity - available_now,
    }
}
