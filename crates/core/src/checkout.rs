//! Checkout message building: the operator notification and the WhatsApp
//! handoff link.
//!
//! These are pure string builders shared by the storefront service and the
//! integration tests. Their output formats are durable contracts: staff
//! tooling parses nothing, but humans read these every day and the store's
//! saved-reply templates reference the `#{short id}` form.

use rust_decimal::Decimal;

use crate::cart::CartLine;
use crate::model::order::{DeliveryMethod, ShippingOption};
use crate::types::id::OrderId;
use crate::types::money::format_ars;

/// The delivery fields captured on the checkout form.
///
/// `label()` and `details()` derive the two strings recorded on the order
/// and printed in the operator message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverySelection {
    pub method: Option<DeliveryMethod>,
    pub shipping_option: Option<ShippingOption>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub notes: Option<String>,
}

impl DeliverySelection {
    /// Human-readable delivery label, e.g. `Correo Argentino (A Domicilio)`.
    ///
    /// A missing method reads as in-store pickup.
    #[must_use]
    pub fn label(&self) -> String {
        self.method
            .unwrap_or(DeliveryMethod::Retiro)
            .label(self.shipping_option)
    }

    /// Whether this selection is an in-store pickup.
    #[must_use]
    pub fn is_pickup(&self) -> bool {
        self.method.unwrap_or(DeliveryMethod::Retiro).is_pickup()
    }

    /// The flattened delivery-details string.
    ///
    /// Pickup orders get a fixed in-store message. Shipped orders get
    /// `{address}, {city}, {province}, CP {zip}` with an `(Obs: ...)` line
    /// appended when the customer left notes.
    #[must_use]
    pub fn details(&self) -> String {
        if self.is_pickup() {
            return "Retiro por el local".to_string();
        }

        let mut details = format!(
            "{}, {}, {}, CP {}",
            self.address.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or(""),
            self.province.as_deref().unwrap_or(""),
            self.zip.as_deref().unwrap_or(""),
        );
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            details.push_str("\n(Obs: ");
            details.push_str(notes);
            details.push(')');
        }
        details
    }

    /// `details()` with newlines folded to spaces, as persisted in the
    /// order's `customer_address` column.
    #[must_use]
    pub fn flattened_details(&self) -> String {
        self.details().replace('\n', " ")
    }
}

/// Build the operator-facing order summary (Telegram Markdown, Spanish).
#[must_use]
pub fn build_operator_message(
    order_id: OrderId,
    customer_name: &str,
    customer_phone: &str,
    customer_email: Option<&str>,
    delivery: &DeliverySelection,
    lines: &[CartLine],
    total: Decimal,
) -> String {
    let mut msg = format!("📦 *NUEVO PEDIDO WEB* #{}\n\n", order_id.short());

    msg.push_str(&format!("👤 *Cliente:* {customer_name}\n"));
    msg.push_str(&format!("📞 *WhatsApp:* {customer_phone}\n"));
    if let Some(email) = customer_email {
        msg.push_str(&format!("📧 *Email:* {email}\n"));
    }
    msg.push('\n');

    msg.push_str(&format!("🚚 *Método:* {}\n", delivery.label()));
    if !delivery.is_pickup() {
        msg.push_str(&format!("📍 *Destino:* {}\n", delivery.details()));
    }
    msg.push('\n');

    msg.push_str("🛒 *Productos:*\n");
    for line in lines {
        msg.push_str(&format!(
            "- {}x {} (${})\n",
            line.quantity,
            line.name,
            format_ars(line.unit_price),
        ));
    }

    msg.push_str(&format!("\n💰 *Total Productos:* ${}", format_ars(total)));
    if !delivery.is_pickup() {
        msg.push_str("\n_(Envío a coordinar)_");
    }

    msg
}

/// The message pre-filled into the customer's WhatsApp chat with the store.
#[must_use]
pub fn build_whatsapp_message(order_id: OrderId, customer_name: &str, store_name: &str) -> String {
    format!(
        "Hola {store_name}! Realicé el pedido #{} ({customer_name}). \
         Quería coordinar el pago y envío.",
        order_id.short(),
    )
}

/// The `wa.me` deep link the client opens right after a successful checkout.
#[must_use]
pub fn build_whatsapp_url(operator_phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{operator_phone}?text={}",
        urlencoding::encode(message)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::id::{ProductId, uuid_from_u128};

    fn order_id() -> OrderId {
        OrderId::new(uuid_from_u128(0xabcd_ef01_0000_0000_0000_0000_0000_0000))
    }

    fn line(name: &str, price: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::generate(),
            name: name.to_string(),
            unit_price: Decimal::from(price),
            quantity,
            image_url: None,
            known_stock: 5,
        }
    }

    fn shipped() -> DeliverySelection {
        DeliverySelection {
            method: Some(DeliveryMethod::CorreoArgentino),
            shipping_option: Some(ShippingOption::Domicilio),
            address: Some("Calle 7 n 1234".to_string()),
            city: Some("La Plata".to_string()),
            province: Some("Buenos Aires".to_string()),
            zip: Some("1900".to_string()),
            notes: None,
        }
    }

    #[test]
    fn pickup_details_is_the_fixed_message() {
        let pickup = DeliverySelection {
            method: Some(DeliveryMethod::Retiro),
            ..DeliverySelection::default()
        };
        assert_eq!(pickup.details(), "Retiro por el local");
        assert_eq!(pickup.label(), "Retiro por Local");
    }

    #[test]
    fn missing_method_reads_as_pickup() {
        let selection = DeliverySelection::default();
        assert!(selection.is_pickup());
        assert_eq!(selection.details(), "Retiro por el local");
    }

    #[test]
    fn shipped_details_joins_address_fields() {
        assert_eq!(
            shipped().details(),
            "Calle 7 n 1234, La Plata, Buenos Aires, CP 1900"
        );
    }

    #[test]
    fn notes_append_an_obs_line() {
        let mut selection = shipped();
        selection.notes = Some("Timbre roto, golpear".to_string());
        assert_eq!(
            selection.details(),
            "Calle 7 n 1234, La Plata, Buenos Aires, CP 1900\n(Obs: Timbre roto, golpear)"
        );
        assert_eq!(
            selection.flattened_details(),
            "Calle 7 n 1234, La Plata, Buenos Aires, CP 1900 (Obs: Timbre roto, golpear)"
        );
    }

    #[test]
    fn blank_notes_are_ignored() {
        let mut selection = shipped();
        selection.notes = Some("   ".to_string());
        assert!(!selection.details().contains("Obs"));
    }

    #[test]
    fn operator_message_for_a_shipped_order() {
        let lines = vec![
            line("Mate Imperial Torpedo", 45_000, 1),
            line("Bombilla Pico Loro Alpaca", 12_000, 2),
        ];
        let msg = build_operator_message(
            order_id(),
            "Juan Pérez",
            "+5491155551234",
            Some("juan@example.com"),
            &shipped(),
            &lines,
            Decimal::from(69_000),
        );

        assert!(msg.starts_with("📦 *NUEVO PEDIDO WEB* #abcdef01\n"));
        assert!(msg.contains("👤 *Cliente:* Juan Pérez"));
        assert!(msg.contains("📞 *WhatsApp:* +5491155551234"));
        assert!(msg.contains("📧 *Email:* juan@example.com"));
        assert!(msg.contains("🚚 *Método:* Correo Argentino (A Domicilio)"));
        assert!(msg.contains("📍 *Destino:* Calle 7 n 1234, La Plata, Buenos Aires, CP 1900"));
        assert!(msg.contains("- 1x Mate Imperial Torpedo ($45.000)"));
        assert!(msg.contains("- 2x Bombilla Pico Loro Alpaca ($12.000)"));
        assert!(msg.contains("💰 *Total Productos:* $69.000"));
        assert!(msg.ends_with("_(Envío a coordinar)_"));
    }

    #[test]
    fn operator_message_for_pickup_omits_destination_and_coordination() {
        let msg = build_operator_message(
            order_id(),
            "Ana",
            "+5491144440000",
            None,
            &DeliverySelection::default(),
            &[line("Termo Media Manija 1L", 80_000, 1)],
            Decimal::from(80_000),
        );

        assert!(msg.contains("🚚 *Método:* Retiro por Local"));
        assert!(!msg.contains("📍 *Destino:*"));
        assert!(!msg.contains("Envío a coordinar"));
        assert!(!msg.contains("📧"));
    }

    #[test]
    fn whatsapp_link_embeds_short_id_and_name() {
        let message = build_whatsapp_message(order_id(), "Juan Pérez", "La Matera");
        assert_eq!(
            message,
            "Hola La Matera! Realicé el pedido #abcdef01 (Juan Pérez). \
             Quería coordinar el pago y envío."
        );

        let url = build_whatsapp_url("5491155550000", &message);
        assert!(url.starts_with("https://wa.me/5491155550000?text="));
        assert!(url.contains("abcdef01"));
        assert!(url.contains("Juan%20P%C3%A9rez"));
        assert!(!url.contains(' '));
    }
}
