//! Order management endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::{info, instrument};

use la_matera_core::{Order, OrderDetails, OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Order listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Status filter (wire name, e.g. `pending`).
    pub status: Option<String>,
}

/// Status update body.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// `GET /api/orders` - newest first, optional `?status=` filter.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Order>>> {
    let status = params
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<OrderStatus>()
                .map_err(AppError::Unprocessable)
        })
        .transpose()?;

    Ok(Json(state.backend().list_orders(status).await?))
}

/// `GET /api/orders/{id}` - order with items.
#[instrument(skip(state), fields(order_id = %id))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetails>> {
    Ok(Json(state.backend().get_order_details(id).await?))
}

/// `PATCH /api/orders/{id}/status`
///
/// Reads the current status and checks the transition before writing:
/// unknown status names are `422`, illegal transitions `409`. The
/// read-then-write is not transactional; concurrent staff edits are rare
/// enough that last-write-wins is acceptable here.
#[instrument(skip(state, body), fields(order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>> {
    let to = body
        .status
        .parse::<OrderStatus>()
        .map_err(AppError::Unprocessable)?;

    let current = state.backend().get_order(id).await?;
    current.status.validate_transition(to)?;

    let updated = state.backend().update_order_status(id, to).await?;
    info!(from = %current.status, to = %to, "order status updated");
    Ok(Json(updated))
}
