//! Product catalog entities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ProductId};
use crate::types::slug::Slug;

/// A sellable product.
///
/// `stock` may go negative: checkout deducts quantities even past zero,
/// recording a backorder commitment to be fulfilled by manual procurement.
/// Stock is only ever mutated by the checkout deduction step or an explicit
/// administrative edit.
///
/// `cost_price` is internal. Public API surfaces must never serialize it;
/// the storefront exposes its own DTO without the field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unique, URL-safe identifier. Derived from `name` when absent at
    /// creation time.
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock: i64,
    /// Ordered image URLs; the first entry is the primary image.
    pub images: Vec<String>,
    /// Weak reference: the category may be deleted independently.
    pub category_id: Option<CategoryId>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The primary (first) image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether any units are immediately available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A catalog category. Referenced by products, never owns them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
}
