//! Checkout submission endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::instrument;

use la_matera_core::OrderId;

use crate::checkout::{CheckoutRequest, submit_order};
use crate::error::Result;
use crate::state::AppState;

/// Checkout response (camelCase wire contract).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub whatsapp_url: String,
    pub order_id: OrderId,
}

/// `POST /api/checkout`
///
/// The client clears its cart only after receiving this response, never
/// speculatively.
#[instrument(skip(state, request))]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let outcome = submit_order(
        state.backend(),
        state.notifier(),
        state.store(),
        request,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            success: true,
            whatsapp_url: outcome.whatsapp_url,
            order_id: outcome.order_id,
        }),
    ))
}
