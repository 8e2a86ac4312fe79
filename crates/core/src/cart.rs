//! The shopping cart: an explicit state container for what the shopper
//! intends to buy.
//!
//! The cart is client-local truth, independent of server stock. Display
//! fields (name, price, image, known stock) are cached at add time so the
//! cart renders without refetching the catalog; `unit_price` in particular
//! is the price the shopper saw and the price that will be snapshotted onto
//! the order.
//!
//! The container itself is pure. Session handling (mutation serialization,
//! serialize-on-write persistence) lives in the storefront crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// One cart line. At most one line exists per distinct product.
///
/// Field names are the camelCase wire contract shared with checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    /// Always positive for a stored line.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Stock as known at the time the line was first added. Advisory only.
    pub known_stock: i64,
}

/// Cart operation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// `update_quantity` only sets positive quantities. Deleting a line is
    /// an explicit `remove_item` call, never an implicit side effect.
    #[error("quantity must be positive; use remove_item to delete a line")]
    NonPositiveQuantity,

    /// The product has no line in this cart.
    #[error("product {product_id} is not in the cart")]
    NotInCart { product_id: ProductId },
}

/// The cart: ordered lines, one per product.
///
/// Serializes transparently as its line array, which is the exact shape
/// written through the persistence boundary on every mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not units; see [`Self::total_items`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add a line to the cart.
    ///
    /// If a line for the same product already exists, its quantity is
    /// incremented by the incoming quantity; the line keeps its position and
    /// the display fields cached at first add. Otherwise the line is
    /// appended. No stock bound is enforced here: stock checks are advisory
    /// and rendered, never blocking. Adding zero units is a no-op.
    pub fn add_item(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
    }

    /// Set the absolute quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NonPositiveQuantity`] for `quantity == 0` and
    /// [`CartError::NotInCart`] when the product has no line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::NonPositiveQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::NotInCart { product_id })?;
        line.quantity = quantity;
        Ok(())
    }

    /// Delete the line for `product_id`, if present.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Empty the cart. Called exactly once, after a successful checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Total price using the cached unit prices, not a live repricing.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum()
    }
}
