//! HTTP route handlers for the admin service.
//!
//! Authentication is delegated to the deployment perimeter; these routes
//! assume a trusted caller.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (probes the backend)
//!
//! # Products
//! GET    /api/products            - List (internal fields included)
//! POST   /api/products            - Create (slug derived when absent)
//! GET    /api/products/{id}       - Detail
//! PUT    /api/products/{id}       - Full update
//! DELETE /api/products/{id}       - Delete (no cascade to order items)
//!
//! # Uploads
//! POST   /api/uploads             - Image upload (HEIC transcoded to JPEG)
//!
//! # Orders
//! GET    /api/orders              - List, newest first (?status= filter)
//! GET    /api/orders/{id}         - Detail with items
//! PATCH  /api/orders/{id}/status  - Status transition (409/422 on rejects)
//!
//! # AI
//! POST   /api/ai/description      - Generate a product description (503
//!                                   when providers are exhausted)
//! ```

pub mod ai;
pub mod orders;
pub mod products;
pub mod uploads;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::detail)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/uploads", post(uploads::upload))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/{id}", get(orders::detail))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/ai/description", post(ai::description))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies backend connectivity before returning OK.
/// Returns 503 Service Unavailable if the backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
