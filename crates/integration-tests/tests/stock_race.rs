//! Concurrent checkouts against the last unit in stock.
//!
//! The decrement is unconditional by design: both orders win and stock goes
//! negative, recording a backorder commitment for staff to procure.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use la_matera_core::{CartLine, DeliveryMethod};
use la_matera_integration_tests::{MemoryBackend, RecordingNotifier, cart_line, product};
use la_matera_storefront::checkout::{CheckoutRequest, StoreIdentity, submit_order};

fn request(name: &str, cart: Vec<CartLine>, total: i64) -> CheckoutRequest {
    CheckoutRequest {
        name: name.to_string(),
        phone: "+5491144440000".to_string(),
        email: None,
        address: None,
        city: None,
        province: None,
        zip: None,
        notes: None,
        delivery_type: DeliveryMethod::Retiro,
        shipping_option: None,
        cart,
        total: Decimal::from(total),
    }
}

#[tokio::test]
async fn two_checkouts_for_the_last_unit_both_succeed() {
    let backend = MemoryBackend::new();
    let notifier = RecordingNotifier::new();
    let store = StoreIdentity {
        store_name: "La Matera".to_string(),
        whatsapp_number: "5491155550000".to_string(),
    };

    let canasta = product("Canasta Matera Cuero", 52_000, 1);
    backend.insert_product(canasta.clone());

    let first = submit_order(
        &backend,
        &notifier,
        &store,
        request("Ana", vec![cart_line(&canasta, 1)], 52_000),
    );
    let second = submit_order(
        &backend,
        &notifier,
        &store,
        request("Juan", vec![cart_line(&canasta, 1)], 52_000),
    );

    let (first, second) = tokio::join!(first, second);
    let first = first.unwrap();
    let second = second.unwrap();
    assert_ne!(first.order_id, second.order_id);

    // Both orders persist and the second deduction overshoots to -1.
    assert_eq!(backend.orders().len(), 2);
    assert_eq!(backend.stock_of(canasta.id), -1);
    assert_eq!(notifier.messages().len(), 2);
}
