//! The administrative backend seam.
//!
//! Route handlers and the seed CLI talk to storage through this trait so
//! tests can substitute an in-memory implementation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use la_matera_core::{
    Category, CategoryId, Order, OrderDetails, OrderId, OrderStatus, Product, ProductId, Slug,
};

use crate::supabase::SupabaseError;

/// A fully-resolved product write. The same shape serves create and full
/// update; slug derivation from the name happens before this is built.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: Slug,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
    pub stock: i64,
    pub images: Vec<String>,
    pub category_id: CategoryId,
    pub featured: bool,
}

/// A new category row.
#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
}

/// Storage operations available to the admin service.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// All products, including internal fields, ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, SupabaseError>;

    /// A single product by id.
    async fn get_product(&self, id: ProductId) -> Result<Product, SupabaseError>;

    /// Insert a product and return the stored row.
    async fn create_product(&self, input: &ProductInput) -> Result<Product, SupabaseError>;

    /// Replace all fields of a product and return the stored row.
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, SupabaseError>;

    /// Delete a product row. Order items keep their snapshots; there is no
    /// cascade.
    async fn delete_product(&self, id: ProductId) -> Result<(), SupabaseError>;

    /// All categories, ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, SupabaseError>;

    /// Insert a category and return the stored row.
    async fn create_category(&self, input: &NewCategory) -> Result<Category, SupabaseError>;

    /// Upload an object to the storage bucket and return its public URL.
    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, SupabaseError>;

    /// Orders newest first, optionally filtered by status.
    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, SupabaseError>;

    /// A single order header.
    async fn get_order(&self, id: OrderId) -> Result<Order, SupabaseError>;

    /// An order with its items for the detail view.
    async fn get_order_details(&self, id: OrderId) -> Result<OrderDetails, SupabaseError>;

    /// Write a new status and return the updated header. Transition
    /// legality is checked by the caller against the current status.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, SupabaseError>;

    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), SupabaseError>;
}
