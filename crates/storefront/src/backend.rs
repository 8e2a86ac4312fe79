//! The storage backend seam.
//!
//! Handlers and the checkout protocol talk to this trait, never to the
//! Supabase client directly; the integration tests substitute an in-memory
//! implementation behind the same seam.

use rust_decimal::Decimal;
use serde::Serialize;

use la_matera_core::{
    Category, Email, Order, OrderDetails, OrderId, OrderMetadata, OrderStatus, Product, ProductId,
};

use crate::supabase::SupabaseError;

/// Catalog listing filters.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Only products in the category with this slug.
    pub category_slug: Option<String>,
    /// Only featured products.
    pub featured_only: bool,
}

/// An order header to persist. The backend assigns id and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub status: OrderStatus,
    pub total: Decimal,
    pub customer_name: String,
    pub customer_email: Option<Email>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub metadata: OrderMetadata,
}

/// An order line to persist, snapshotting quantity and unit price from the
/// cart. Never re-read from the live product.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Storage operations the storefront needs.
#[async_trait::async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// List products ordered by name, optionally filtered.
    async fn list_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, SupabaseError>;

    /// Fetch a single product by slug.
    async fn get_product_by_slug(&self, slug: &str) -> Result<Product, SupabaseError>;

    /// List categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, SupabaseError>;

    /// Persist an order header and return the stored row.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, SupabaseError>;

    /// Persist order lines in one batch.
    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), SupabaseError>;

    /// Atomically decrement a product's stock by `quantity`. Stock may go
    /// negative (backorder commitment).
    async fn decrement_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), SupabaseError>;

    /// Fetch an order with denormalized items for tracking.
    async fn get_order_details(&self, id: OrderId) -> Result<OrderDetails, SupabaseError>;

    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), SupabaseError>;
}
