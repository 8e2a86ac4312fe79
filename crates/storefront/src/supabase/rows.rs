//! Raw storage rows and their conversions into domain records.
//!
//! Every row that comes back from the REST backend deserializes into one of
//! these structs first and is then converted with `TryFrom`. Shape
//! mismatches (bad UUIDs, unparseable decimals, unknown statuses) fail
//! loudly as [`SupabaseError::DataCorruption`] naming the entity, row id,
//! and field instead of leaking untyped data into the core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use la_matera_core::{
    Category, CategoryId, Email, Order, OrderDetailItem, OrderDetails, OrderId, OrderMetadata,
    OrderStatus, Product, ProductId, Slug,
};

use super::SupabaseError;

/// A `products` table row.
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

/// An `orders` row with its items embedded, as returned by the tracking
/// query `select=*,order_items(quantity,unit_price,products(name,images))`.
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
                    product_image: item
                        .products
                        .and_then(|p| p.images.into_iter().next()),
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
///
/// PostgREST renders `numeric` columns as JSON numbers; string passthrough
/// covers rows written with string-serialized decimals.
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product_json() -> serde_json::Value {
        json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Mate Imperial Torpedo",
            "slug": "mate-imperial-torpedo",
            "description": null,
            "price": 45000,
            "cost_price": 21000.50,
            "stock": 5,
            "images": ["https://cdn.example.com/mate.jpg"],
            "category_id": "00000000-0000-0000-0000-000000000002",
            "featured": true,
            "created_at": "2026-08-01T12:00:00+00:00"
        })
    }

    #[test]
    fn product_row_converts() {
        let row: ProductRow = serde_json::from_value(product_json()).unwrap();
        let product = Product::try_from(row).unwrap();

        assert_eq!(product.name, "Mate Imperial Torpedo");
        assert_eq!(product.price, Decimal::from(45_000));
        assert_eq!(product.cost_price.unwrap().to_string(), "21000.50");
        assert_eq!(product.stock, 5);
        assert!(product.featured);
    }

    #[test]
    fn malformed_uuid_is_data_corruption() {
        let mut value = product_json();
        value["id"] = json!("not-a-uuid");
        let row: ProductRow = serde_json::from_value(value).unwrap();

        let err = Product::try_from(row).unwrap_err();
        match err {
            SupabaseError::DataCorruption { entity, field, .. } => {
                assert_eq!(entity, "products");
                assert_eq!(field, "id");
            }
            other => panic!("expected DataCorruption, got {other}"),
        }
    }

    #[test]
    fn malformed_decimal_is_data_corruption() {
        let mut value = product_json();
        value["price"] = json!({"amount": 45000});
        let row: ProductRow = serde_json::from_value(value).unwrap();

        let err = Product::try_from(row).unwrap_err();
        match err {
            SupabaseError::DataCorruption { entity, field, .. } => {
                assert_eq!(entity, "products");
                assert_eq!(field, "price");
            }
            other => panic!("expected DataCorruption, got {other}"),
        }
    }

    #[test]
    fn order_details_row_converts_with_deleted_product() {
        let value = json!({
            "id": "00000000-0000-0000-0000-000000000003",
            "created_at": "2026-08-02T09:30:00+00:00",
            "status": "pending",
            "total": 57000,
            "customer_name": "Juan Pérez",
            "customer_email": "juan@example.com",
            "customer_phone": "+5491155551234",
            "customer_address": "Calle 7 n 1234, La Plata, Buenos Aires, CP 1900",
            "metadata": {"deliveryType": "correo_argentino", "shippingOption": "domicilio"},
            "order_items": [
                {"quantity": 1, "unit_price": 45000, "products": {"name": "Mate", "images": ["a.jpg"]}},
                {"quantity": 2, "unit_price": 6000, "products": null}
            ]
        });

        let row: OrderDetailsRow = serde_json::from_value(value).unwrap();
        let details = OrderDetails::try_from(row).unwrap();

        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.items[0].product_name.as_deref(), Some("Mate"));
        assert_eq!(details.items[0].product_image.as_deref(), Some("a.jpg"));
        // Product deleted after purchase: snapshot survives without it
        assert!(details.items[1].product_name.is_none());
        assert_eq!(details.items[1].unit_price, Decimal::from(6000));
    }

    #[test]
    fn unknown_status_is_data_corruption() {
        let value = json!({
            "id": "00000000-0000-0000-0000-000000000003",
            "created_at": "2026-08-02T09:30:00+00:00",
            "status": "completed",
            "total": 100,
            "customer_name": "Ana"
        });

        let row: OrderRow = serde_json::from_value(value).unwrap();
        let err = Order::try_from(row).unwrap_err();
        match err {
            SupabaseError::DataCorruption { entity, field, .. } => {
                assert_eq!(entity, "orders");
                assert_eq!(field, "status");
            }
            other => panic!("expected DataCorruption, got {other}"),
        }
    }
}
