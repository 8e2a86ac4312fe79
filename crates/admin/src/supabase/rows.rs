//! Storage row shapes and conversions for the admin client.
//!
//! Rows deserialize into loosely-typed structs and convert into domain
//! records with `TryFrom`. Malformed values (bad UUIDs, decimals, statuses)
//! surface as [`SupabaseError::DataCorruption`] naming the entity, row id,
//! and offending field.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use la_matera_core::{
    Category, CategoryId, Email, Order, OrderDetailItem, OrderDetails, OrderId, OrderMetadata,
    OrderStatus, Product, ProductId, Slug,
};

use super::SupabaseError;

/// A `products` table row, internal fields included.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: serde_json::Value,
    #[serde(default)]
    pub cost_price: Option<serde_json::Value>,
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub created_at: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = SupabaseError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row.id.clone();
        Ok(Self {
            id: parse_field("products", &id, "id", ProductId::parse(&row.id))?,
            slug: parse_field("products", &id, "slug", Slug::parse(&row.slug))?,
            price: parse_decimal("products", &id, "price", &row.price)?,
            cost_price: row
                .cost_price
                .as_ref()
                .filter(|v| !v.is_null())
                .map(|v| parse_decimal("products", &id, "cost_price", v))
                .transpose()?,
            category_id: row
                .category_id
                .as_deref()
                .map(|v| parse_field("products", &id, "category_id", CategoryId::parse(v)))
                .transpose()?,
            created_at: parse_timestamp("products", &id, "created_at", &row.created_at)?,
            name: row.name,
            description: row.description,
            stock: row.stock,
            images: row.images,
            featured: row.featured,
        })
    }
}

/// A `categories` table row.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = SupabaseError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let id = row.id.clone();
        Ok(Self {
            id: parse_field("categories", &id, "id", CategoryId::parse(&row.id))?,
            slug: parse_field("categories", &id, "slug", Slug::parse(&row.slug))?,
            created_at: parse_timestamp("categories", &id, "created_at", &row.created_at)?,
            name: row.name,
        })
    }
}

/// An `orders` table row.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub id: String,
    pub created_at: String,
    pub status: String,
    pub total: serde_json::Value,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl TryFrom<OrderRow> for Order {
    type Error = SupabaseError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = row.id.clone();
        Ok(Self {
            id: parse_field("orders", &id, "id", OrderId::parse(&row.id))?,
            created_at: parse_timestamp("orders", &id, "created_at", &row.created_at)?,
            status: parse_field("orders", &id, "status", row.status.parse::<OrderStatus>())?,
            total: parse_decimal("orders", &id, "total", &row.total)?,
            customer_email: row
                .customer_email
                .as_deref()
                .map(|v| parse_field("orders", &id, "customer_email", Email::parse(v)))
                .transpose()?,
            metadata: row
                .metadata
                .filter(|v| !v.is_null())
                .map(|v| {
                    serde_json::from_value::<OrderMetadata>(v).map_err(|e| {
                        SupabaseError::corrupt("orders", &id, "metadata", &e.to_string())
                    })
                })
                .transpose()?,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
        })
    }
}

/// An `orders` row with embedded items, from
/// `select=*,order_items(quantity,unit_price,products(name,images))`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetailsRow {
    #[serde(flatten)]
    pub order: OrderRow,
    #[serde(default)]
    pub order_items: Vec<OrderItemJoinRow>,
}

/// An embedded `order_items` row joined with its (possibly deleted) product.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemJoinRow {
    pub quantity: u32,
    pub unit_price: serde_json::Value,
    #[serde(default)]
    pub products: Option<ProductJoinRow>,
}

/// Display fields of the product referenced by an order item.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductJoinRow {
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl TryFrom<OrderDetailsRow> for OrderDetails {
    type Error = SupabaseError;

    fn try_from(row: OrderDetailsRow) -> Result<Self, Self::Error> {
        let order_id = row.order.id.clone();
        let items = row
            .order_items
            .into_iter()
            .map(|item| {
                Ok(OrderDetailItem {
                    quantity: item.quantity,
                    unit_price: parse_decimal(
                        "order_items",
                        &order_id,
                        "unit_price",
                        &item.unit_price,
                    )?,
                    product_name: item.products.as_ref().map(|p| p.name.clone()),
                    product_image: item.products.and_then(|p| p.images.into_iter().next()),
                })
            })
            .collect::<Result<Vec<_>, SupabaseError>>()?;

        Ok(Self {
            order: row.order.try_into()?,
            items,
        })
    }
}

// =============================================================================
// Field parsing helpers
// =============================================================================

/// Convert a field-level parse failure into a `DataCorruption` error.
pub(super) fn parse_field<T, E: std::fmt::Display>(
    entity: &'static str,
    id: &str,
    field: &'static str,
    result: Result<T, E>,
) -> Result<T, SupabaseError> {
    result.map_err(|e| SupabaseError::corrupt(entity, id, field, &e.to_string()))
}

/// Parse a JSON number or string into a `Decimal`.
pub(super) fn parse_decimal(
    entity: &'static str,
    id: &str,
    field: &'static str,
    value: &serde_json::Value,
) -> Result<Decimal, SupabaseError> {
    let raw = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => {
            return Err(SupabaseError::corrupt(
                entity,
                id,
                field,
                &format!("expected a number, got {other}"),
            ));
        }
    };
    parse_field(entity, id, field, raw.parse::<Decimal>())
}

/// Parse an RFC 3339 timestamp into `DateTime<Utc>`.
pub(super) fn parse_timestamp(
    entity: &'static str,
    id: &str,
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, SupabaseError> {
    parse_field(
        entity,
        id,
        field,
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)),
    )
}
