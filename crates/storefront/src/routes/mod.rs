//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (probes the backend)
//!
//! # Catalog
//! GET  /api/products           - Product listing (?category=slug, ?featured=true)
//! GET  /api/products/{slug}    - Product detail
//! GET  /api/categories         - Category listing
//!
//! # Orders
//! POST /api/checkout           - Submit an order
//! GET  /api/orders/{id}        - Order tracking
//! ```

pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/products", get(products::list))
        .route("/api/products/{slug}", get(products::detail))
        .route("/api/categories", get(categories::list))
        .route("/api/checkout", post(checkout::submit))
        .route("/api/orders/{id}", get(orders::track))
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
