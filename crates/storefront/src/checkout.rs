//! The order submission protocol.
//!
//! Orchestrates a checkout over the backend and notifier seams, in order:
//!
//! 1. validate the request and derive the delivery label/details
//! 2. persist the order header (`pending`) - failure aborts everything
//! 3. persist the order lines - failure is logged, the order stays
//! 4. atomically decrement stock per line - failures logged and skipped
//! 5. dispatch the operator notification - best-effort, never fails the order
//! 6. return the order id and the WhatsApp handoff link
//!
//! Steps 2-4 are deliberately not one transaction: an order header with
//! missing items is a recognized inconsistency window that staff resolve
//! over the payment-coordination chat, preferable to losing the order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use la_matera_core::checkout::{
    DeliverySelection, build_operator_message, build_whatsapp_message, build_whatsapp_url,
};
use la_matera_core::{
    CartLine, DeliveryMethod, Email, OrderId, OrderMetadata, OrderStatus, ShippingOption,
};

use crate::backend::{NewOrder, NewOrderItem, StorefrontBackend};
use crate::services::telegram::OrderNotifier;
use crate::supabase::SupabaseError;

/// The checkout submission body (camelCase wire contract).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub delivery_type: DeliveryMethod,
    #[serde(default)]
    pub shipping_option: Option<ShippingOption>,
    pub cart: Vec<CartLine>,
    /// Trusted from the client in this design; not recomputed server-side.
    pub total: Decimal,
}

/// Successful submission: what the client needs to redirect the shopper.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub order_id: OrderId,
    pub whatsapp_url: String,
}

/// Checkout failures. Validation rejects before any write; a backend error
/// here means the order header itself could not be created.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("invalid checkout request: {0}")]
    Validation(String),

    #[error(transparent)]
    Backend(#[from] SupabaseError),
}

/// Store identity embedded in the handoff link and message.
#[derive(Debug, Clone)]
pub struct StoreIdentity {
    pub store_name: String,
    pub whatsapp_number: String,
}

/// Validate a checkout request and derive its delivery selection.
///
/// # Errors
///
/// Returns `CheckoutError::Validation` with a user-facing message; nothing
/// has been persisted when this fails.
pub fn validate_request(request: &CheckoutRequest) -> Result<DeliverySelection, CheckoutError> {
    if request.name.trim().is_empty() {
        return Err(CheckoutError::Validation("name is required".to_string()));
    }
    if request.phone.trim().is_empty() {
        return Err(CheckoutError::Validation("phone is required".to_string()));
    }
    if request.cart.is_empty() {
        return Err(CheckoutError::Validation("cart is empty".to_string()));
    }
    if request.cart.iter().any(|line| line.quantity == 0) {
        return Err(CheckoutError::Validation(
            "cart quantities must be positive".to_string(),
        ));
    }

    let selection = DeliverySelection {
        method: Some(request.delivery_type),
        shipping_option: request.shipping_option,
        address: non_blank(&request.address),
        city: non_blank(&request.city),
        province: non_blank(&request.province),
        zip: non_blank(&request.zip),
        notes: non_blank(&request.notes),
    };

    if !selection.is_pickup() {
        for (value, field) in [
            (&selection.address, "address"),
            (&selection.city, "city"),
            (&selection.province, "province"),
            (&selection.zip, "zip"),
        ] {
            if value.is_none() {
                return Err(CheckoutError::Validation(format!(
                    "{field} is required for shipped orders"
                )));
            }
        }
    }

    Ok(selection)
}

/// Run the full submission protocol.
///
/// # Errors
///
/// Returns `Validation` before any write, or `Backend` when the order
/// header could not be created. Item, stock, and notification failures
/// after the header write are logged and do not fail the submission.
#[instrument(skip_all, fields(customer = %request.name, lines = request.cart.len()))]
pub async fn submit_order(
    backend: &dyn StorefrontBackend,
    notifier: &dyn OrderNotifier,
    store: &StoreIdentity,
    request: CheckoutRequest,
) -> Result<CheckoutOutcome, CheckoutError> {
    let selection = validate_request(&request)?;

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| {
            Email::parse(e).map_err(|err| CheckoutError::Validation(format!("invalid email: {err}")))
        })
        .transpose()?;

    let new_order = NewOrder {
        status: OrderStatus::Pending,
        total: request.total,
        customer_name: request.name.trim().to_string(),
        customer_email: email.clone(),
        customer_phone: Some(request.phone.trim().to_string()),
        customer_address: Some(selection.flattened_details()),
        metadata: OrderMetadata {
            delivery_type: Some(request.delivery_type),
            shipping_option: request.shipping_option,
            city: selection.city.clone(),
            province: selection.province.clone(),
            zip: selection.zip.clone(),
            notes: selection.notes.clone(),
            address: selection.address.clone(),
        },
    };

    // Step 2: the header write is the point of no return. Failure here
    // aborts the whole submission.
    let order = backend.create_order(&new_order).await?;

    // Step 3: order lines, snapshotting quantity and unit price from the
    // cart. The header already exists; a failure leaves a pending order
    // with missing items, logged for staff followup.
    let items: Vec<NewOrderItem> = request
        .cart
        .iter()
        .map(|line| NewOrderItem {
            order_id: order.id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .collect();

    if let Err(error) = backend.insert_order_items(&items).await {
        warn!(
            order_id = %order.id,
            %error,
            "order items insert failed; order persists without items"
        );
    }

    // Step 4: per-line stock deduction, independent per product. Stock may
    // go negative (backorder commitment).
    for line in &request.cart {
        if let Err(error) = backend.decrement_stock(line.product_id, line.quantity).await {
            warn!(
                order_id = %order.id,
                product_id = %line.product_id,
                quantity = line.quantity,
                %error,
                "stock decrement failed; skipping line"
            );
        }
    }

    // Step 5: operator notification, swallowed on failure.
    let message = build_operator_message(
        order.id,
        &order.customer_name,
        order.customer_phone.as_deref().unwrap_or(""),
        email.as_ref().map(Email::as_str),
        &selection,
        &request.cart,
        request.total,
    );
    if let Err(error) = notifier.notify_new_order(&message).await {
        warn!(order_id = %order.id, %error, "order notification failed");
    }

    // Step 6: the handoff link the client opens immediately.
    let whatsapp_url = build_whatsapp_url(
        &store.whatsapp_number,
        &build_whatsapp_message(order.id, &order.customer_name, &store.store_name),
    );

    Ok(CheckoutOutcome {
        order_id: order.id,
        whatsapp_url,
    })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use la_matera_core::ProductId;

    use super::*;

    fn line(quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::generate(),
            name: "Mate Camionero".to_string(),
            unit_price: Decimal::from(30_000),
            quantity,
            image_url: None,
            known_stock: 3,
        }
    }

    fn pickup_request() -> CheckoutRequest {
        CheckoutRequest {
            name: "Ana".to_string(),
            phone: "+5491144440000".to_string(),
            email: None,
            address: None,
            city: None,
            province: None,
            zip: None,
            notes: None,
            delivery_type: DeliveryMethod::Retiro,
            shipping_option: None,
            cart: vec![line(1)],
            total: Decimal::from(30_000),
        }
    }

    #[test]
    fn pickup_request_is_valid_without_address() {
        let selection = validate_request(&pickup_request()).unwrap();
        assert!(selection.is_pickup());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut request = pickup_request();
        request.name = "   ".to_string();
        assert!(matches!(
            validate_request(&request),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let mut request = pickup_request();
        request.cart.clear();
        assert!(matches!(
            validate_request(&request),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let mut request = pickup_request();
        request.cart.push(line(0));
        assert!(matches!(
            validate_request(&request),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn shipped_order_requires_full_address() {
        let mut request = pickup_request();
        request.delivery_type = DeliveryMethod::CorreoArgentino;
        request.shipping_option = Some(ShippingOption::Domicilio);
        request.address = Some("Calle 7 n 1234".to_string());
        request.city = Some("La Plata".to_string());
        // province and zip missing
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("province"));

        request.province = Some("Buenos Aires".to_string());
        request.zip = Some("1900".to_string());
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::json!({
            "name": "Ana",
            "phone": "123",
            "deliveryType": "correo_argentino",
            "shippingOption": "sucursal",
            "cart": [],
            "total": "100"
        });
        let request: CheckoutRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.delivery_type, DeliveryMethod::CorreoArgentino);
        assert_eq!(request.shipping_option, Some(ShippingOption::Sucursal));
    }
}
