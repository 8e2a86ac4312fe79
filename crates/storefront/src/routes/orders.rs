//! Order tracking endpoint.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use la_matera_core::{OrderDetails, OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// A tracked order: header plus denormalized lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedOrder {
    pub order_id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub total: Decimal,
    pub customer_name: String,
    pub delivery_label: Option<String>,
    pub items: Vec<TrackedItem>,
}

/// One tracked line with its price snapshot and product display fields.
/// Product fields are null when the product was deleted after purchase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub quantity: u32,
    pub unit_price: Decimal,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
}

impl From<OrderDetails> for TrackedOrder {
    fn from(details: OrderDetails) -> Self {
        let order = details.order;
        Self {
            order_id: order.id,
            created_at: order.created_at,
            status: order.status,
            status_label: order.status.label(),
            total: order.total,
            customer_name: order.customer_name,
            delivery_label: order.metadata.as_ref().and_then(|m| m.delivery_label()),
            items: details
                .items
                .into_iter()
                .map(|item| TrackedItem {
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    product_name: item.product_name,
                    product_image: item.product_image,
                })
                .collect(),
        }
    }
}

/// `GET /api/orders/{id}`
///
/// Unknown and malformed ids both read as "order not found": tracking codes
/// are opaque to shoppers, and the distinction leaks nothing useful.
#[instrument(skip(state), fields(order_id = %id))]
pub async fn track(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrackedOrder>> {
    let order_id =
        OrderId::parse(&id).map_err(|_| AppError::NotFound(format!("order {id}")))?;

    let details = state.backend().get_order_details(order_id).await?;
    Ok(Json(details.into()))
}
