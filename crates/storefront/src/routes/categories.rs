//! Category listing endpoint.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use la_matera_core::Category;

use crate::error::Result;
use crate::state::AppState;

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.backend().list_categories().await?;
    Ok(Json(categories))
}
