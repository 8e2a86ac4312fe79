//! Orders, order items, and the delivery selection recorded with them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::{OrderId, OrderItemId, ProductId};
use crate::types::status::OrderStatus;

/// How the customer receives their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// In-store pickup.
    Retiro,
    /// Same-day courier within AMBA.
    EnvioExpress,
    /// National postal service.
    CorreoArgentino,
}

impl DeliveryMethod {
    /// The snake_case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retiro => "retiro",
            Self::EnvioExpress => "envio_express",
            Self::CorreoArgentino => "correo_argentino",
        }
    }

    /// Human-readable Spanish label shown to staff and customers.
    ///
    /// For `correo_argentino` the label includes the branch/home sub-option;
    /// a missing sub-option reads as home delivery.
    #[must_use]
    pub fn label(self, option: Option<ShippingOption>) -> String {
        match self {
            Self::Retiro => "Retiro por Local".to_string(),
            Self::EnvioExpress => "Envío Express (AMBA)".to_string(),
            Self::CorreoArgentino => {
                let mode = match option {
                    Some(ShippingOption::Sucursal) => "A Sucursal",
                    _ => "A Domicilio",
                };
                format!("Correo Argentino ({mode})")
            }
        }
    }

    /// Pickup orders have no shipping destination.
    #[must_use]
    pub const fn is_pickup(self) -> bool {
        matches!(self, Self::Retiro)
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-option for `correo_argentino`: deliver home or to a branch office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingOption {
    Domicilio,
    Sucursal,
}

/// The raw delivery fields captured at checkout, stored on the order as an
/// opaque bag so the selection can be reconstructed later.
///
/// Field names are a durable wire contract (camelCase in storage).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<DeliveryMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_option: Option<ShippingOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl OrderMetadata {
    /// Delivery label for display, when the method was recorded.
    #[must_use]
    pub fn delivery_label(&self) -> Option<String> {
        self.delivery_type.map(|m| m.label(self.shipping_option))
    }
}

/// An order header.
///
/// Created once at checkout; immutable afterwards except for `status`,
/// which only administrative actors change. Never deleted through the
/// normal flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    /// Total as submitted by the client. Not recomputed server-side.
    pub total: Decimal,
    pub customer_name: String,
    pub customer_email: Option<Email>,
    pub customer_phone: Option<String>,
    /// Flattened delivery details (newlines folded to spaces).
    pub customer_address: Option<String>,
    pub metadata: Option<OrderMetadata>,
}

/// A line on an order.
///
/// `unit_price` is a frozen snapshot taken from the cart at order time. It
/// must never be recomputed from the live product, even if that product's
/// price later changes. `product_id` is a weak reference: the product may
/// be deleted while the item remains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// An order with its items denormalized for tracking display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderDetailItem>,
}

/// One tracked line: the snapshot plus current product display fields.
///
/// Product fields are `None` when the product was deleted after purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetailItem {
    pub quantity: u32,
    pub unit_price: Decimal,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
}
