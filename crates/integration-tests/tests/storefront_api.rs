//! Storefront HTTP surface tests: routing, status codes, and the public
//! product shape.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use tower::ServiceExt;

use la_matera_integration_tests::{
    MemoryBackend, RecordingNotifier, cart_line, product, storefront_test_config,
};
use la_matera_storefront::routes;
use la_matera_storefront::state::AppState;

fn app(backend: Arc<MemoryBackend>, notifier: Arc<RecordingNotifier>) -> axum::Router {
    let state = AppState::with_parts(storefront_test_config(), backend, notifier);
    routes::routes().with_state(state)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn product_listing_hides_cost_price() {
    let backend = Arc::new(MemoryBackend::new());
    let mut mate = product("Mate Imperial Torpedo", 45_000, 5);
    mate.cost_price = Some(Decimal::from(21_000));
    backend.insert_product(mate);

    let app = app(backend, Arc::new(RecordingNotifier::new()));
    let (status, json) = get(app, "/api/products").await;

    assert_eq!(status, StatusCode::OK);
    let listing = json.as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["name"], "Mate Imperial Torpedo");
    assert_eq!(listing[0]["inStock"], true);
    assert!(listing[0].get("costPrice").is_none());
    assert!(listing[0].get("cost_price").is_none());
}

#[tokio::test]
async fn unknown_product_slug_is_not_found() {
    let app = app(
        Arc::new(MemoryBackend::new()),
        Arc::new(RecordingNotifier::new()),
    );
    let (status, json) = get(app, "/api/products/no-such-product").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn malformed_order_id_reads_as_not_found() {
    let app = app(
        Arc::new(MemoryBackend::new()),
        Arc::new(RecordingNotifier::new()),
    );
    let (status, _) = get(app, "/api/orders/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_returns_created_with_the_handoff_link() {
    let backend = Arc::new(MemoryBackend::new());
    let mate = product("Mate Imperial Torpedo", 45_000, 5);
    backend.insert_product(mate.clone());

    let body = serde_json::json!({
        "name": "Ana",
        "phone": "+5491144440000",
        "deliveryType": "retiro",
        "cart": [serde_json::to_value(cart_line(&mate, 1)).unwrap()],
        "total": "45000",
    });

    let app = app(backend.clone(), Arc::new(RecordingNotifier::new()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/checkout")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["success"], true);
    let url = json["whatsappUrl"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/5491155550000?text="));

    let order_id = json["orderId"].as_str().unwrap();
    assert_eq!(backend.orders()[0].id.to_string(), order_id);
}

#[tokio::test]
async fn checkout_with_an_empty_cart_is_a_bad_request() {
    let body = serde_json::json!({
        "name": "Ana",
        "phone": "+5491144440000",
        "deliveryType": "retiro",
        "cart": [],
        "total": "0",
    });

    let backend = Arc::new(MemoryBackend::new());
    let app = app(backend.clone(), Arc::new(RecordingNotifier::new()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/checkout")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(backend.orders().is_empty());
}

#[tokio::test]
async fn order_tracking_returns_the_public_shape() {
    let backend = Arc::new(MemoryBackend::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mate = product("Mate Imperial Torpedo", 45_000, 5);
    backend.insert_product(mate.clone());

    // Place an order through the real protocol, then track it.
    let body = serde_json::json!({
        "name": "Ana",
        "phone": "+5491144440000",
        "deliveryType": "retiro",
        "cart": [serde_json::to_value(cart_line(&mate, 1)).unwrap()],
        "total": "45000",
    });
    let response = app(backend.clone(), notifier.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/checkout")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let placed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let order_id = placed["orderId"].as_str().unwrap();

    let (status, json) = get(
        app(backend, notifier),
        &format!("/api/orders/{order_id}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["orderId"], *order_id);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["statusLabel"], "Pendiente");
    assert_eq!(json["deliveryLabel"], "Retiro por Local");
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productName"], "Mate Imperial Torpedo");
}

#[tokio::test]
async fn readiness_probes_the_backend() {
    let app = app(
        Arc::new(MemoryBackend::new()),
        Arc::new(RecordingNotifier::new()),
    );
    let (status, _) = get(app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}
