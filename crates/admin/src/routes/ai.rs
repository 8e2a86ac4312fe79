//! AI description generation endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::ai::{Tone, build_description_prompt};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Description request body (camelCase wire contract).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub tone: Option<Tone>,
}

/// Description response.
#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

/// `POST /api/ai/description`
///
/// `503` when no provider is configured or every provider failed.
#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn description(
    State(state): State<AppState>,
    Json(body): Json<DescriptionRequest>,
) -> Result<Json<DescriptionResponse>> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if body.category.trim().is_empty() {
        return Err(AppError::BadRequest("category is required".to_string()));
    }

    let prompt = build_description_prompt(
        body.name.trim(),
        body.category.trim(),
        body.context.as_deref(),
        body.tone.unwrap_or_default(),
    );

    let description = state.generator().generate(&prompt).await?;
    Ok(Json(DescriptionResponse { description }))
}
