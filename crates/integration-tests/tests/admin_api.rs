//! Admin API policy tests: the order status machine at the route layer,
//! listing order, AI availability, and the upload pipeline.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use la_matera_admin::ai::FallbackChain;
use la_matera_admin::error::AppError;
use la_matera_admin::routes::orders::{ListParams, StatusBody};
use la_matera_admin::routes::{self, ai, orders};
use la_matera_admin::state::AppState;
use la_matera_core::OrderStatus;
use la_matera_integration_tests::{MemoryBackend, StubTranscoder, admin_test_config, order};

fn admin_state(backend: Arc<MemoryBackend>) -> AppState {
    AppState::with_parts(
        admin_test_config(),
        backend,
        Arc::new(FallbackChain::new(vec![])),
        Arc::new(StubTranscoder),
    )
}

async fn update_status(
    state: &AppState,
    id: la_matera_core::OrderId,
    status: &str,
) -> Result<Json<la_matera_core::Order>, AppError> {
    orders::update_status(
        State(state.clone()),
        Path(id),
        Json(StatusBody {
            status: status.to_string(),
        }),
    )
    .await
}

#[tokio::test]
async fn forward_status_movement_is_allowed() {
    let backend = Arc::new(MemoryBackend::new());
    let pending = order(OrderStatus::Pending, 10);
    backend.insert_order(pending.clone());
    let state = admin_state(backend.clone());

    let Json(updated) = update_status(&state, pending.id, "paid").await.unwrap();
    assert_eq!(updated.status, OrderStatus::Paid);
    assert_eq!(backend.orders()[0].status, OrderStatus::Paid);
}

#[tokio::test]
async fn non_terminal_statuses_move_freely_backwards() {
    let backend = Arc::new(MemoryBackend::new());
    let shipped = order(OrderStatus::Shipped, 10);
    backend.insert_order(shipped.clone());
    let state = admin_state(backend);

    let Json(updated) = update_status(&state, shipped.id, "pending").await.unwrap();
    assert_eq!(updated.status, OrderStatus::Pending);
}

#[tokio::test]
async fn terminal_orders_are_frozen() {
    let backend = Arc::new(MemoryBackend::new());
    let delivered = order(OrderStatus::Delivered, 10);
    let cancelled = order(OrderStatus::Cancelled, 20);
    backend.insert_order(delivered.clone());
    backend.insert_order(cancelled.clone());
    let state = admin_state(backend.clone());

    let err = update_status(&state, delivered.id, "paid").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = update_status(&state, cancelled.id, "pending").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Nothing was written.
    let orders = backend.orders();
    assert!(orders.iter().any(|o| o.status == OrderStatus::Delivered));
    assert!(orders.iter().any(|o| o.status == OrderStatus::Cancelled));
}

#[tokio::test]
async fn same_status_update_is_a_conflict() {
    let backend = Arc::new(MemoryBackend::new());
    let pending = order(OrderStatus::Pending, 10);
    backend.insert_order(pending.clone());
    let state = admin_state(backend);

    let err = update_status(&state, pending.id, "pending").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn unknown_status_name_is_unprocessable() {
    let backend = Arc::new(MemoryBackend::new());
    let pending = order(OrderStatus::Pending, 10);
    backend.insert_order(pending.clone());
    let state = admin_state(backend.clone());

    let err = update_status(&state, pending.id, "archived").await.unwrap_err();
    assert!(matches!(err, AppError::Unprocessable(_)));
    assert_eq!(backend.orders()[0].status, OrderStatus::Pending);
}

#[tokio::test]
async fn order_list_is_newest_first_with_status_filter() {
    let backend = Arc::new(MemoryBackend::new());
    let oldest = order(OrderStatus::Pending, 30);
    let middle = order(OrderStatus::Paid, 20);
    let newest = order(OrderStatus::Pending, 10);
    backend.insert_order(oldest.clone());
    backend.insert_order(middle.clone());
    backend.insert_order(newest.clone());
    let state = admin_state(backend);

    let Json(all) = orders::list(State(state.clone()), Query(ListParams { status: None }))
        .await
        .unwrap();
    let ids: Vec<_> = all.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

    let Json(pending) = orders::list(
        State(state.clone()),
        Query(ListParams {
            status: Some("pending".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|o| o.status == OrderStatus::Pending));

    let err = orders::list(
        State(state),
        Query(ListParams {
            status: Some("archived".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unprocessable(_)));
}

#[tokio::test]
async fn description_without_providers_is_unavailable() {
    let state = admin_state(Arc::new(MemoryBackend::new()));

    let err = ai::description(
        State(state),
        Json(ai::DescriptionRequest {
            name: "Mate Imperial Torpedo".to_string(),
            category: "Mates".to_string(),
            context: None,
            tone: None,
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn blank_description_request_is_rejected_before_the_chain() {
    let state = admin_state(Arc::new(MemoryBackend::new()));

    let err = ai::description(
        State(state),
        Json(ai::DescriptionRequest {
            name: "   ".to_string(),
            category: "Mates".to_string(),
            context: None,
            tone: None,
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

fn multipart_body(boundary: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn post_upload(
    state: AppState,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> (StatusCode, serde_json::Value) {
    let boundary = "la-matera-test-boundary";
    let request = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(multipart_body(boundary, filename, content_type, bytes)))
        .unwrap();

    let response = routes::routes()
        .with_state(state)
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn heic_upload_is_transcoded_to_jpeg() {
    let backend = Arc::new(MemoryBackend::new());
    let state = admin_state(backend.clone());

    let (status, json) = post_upload(state, "photo.heic", "image/heic", b"fake heic bytes").await;

    assert_eq!(status, StatusCode::CREATED);
    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("memory://bucket/products/"));
    assert!(url.ends_with(".jpg"));

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    let (path, content_type, size) = &uploads[0];
    assert!(path.ends_with(".jpg"));
    assert_eq!(content_type, "image/jpeg");
    // The stub transcoder emits a 4-byte JPEG marker pair.
    assert_eq!(*size, 4);
}

#[tokio::test]
async fn plain_image_upload_is_stored_as_is() {
    let backend = Arc::new(MemoryBackend::new());
    let state = admin_state(backend.clone());

    let bytes = b"png payload";
    let (status, json) = post_upload(state, "photo.png", "image/png", bytes).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["url"].as_str().unwrap().ends_with(".png"));

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    let (path, content_type, size) = &uploads[0];
    assert!(path.starts_with("products/") && path.ends_with(".png"));
    assert_eq!(content_type, "image/png");
    assert_eq!(*size, bytes.len());
}
