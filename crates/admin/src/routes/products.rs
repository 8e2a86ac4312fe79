//! Product management endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use la_matera_core::{CategoryId, Product, ProductId, Slug};

use crate::backend::ProductInput;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product write body (camelCase wire contract), shared by create and
/// update. `slug` is optional; it is derived from `name` when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub featured: bool,
}

/// Validate a write body and resolve its slug.
fn resolve_input(body: ProductBody) -> Result<ProductInput> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if body.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be positive".to_string()));
    }

    let slug = match body.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            Slug::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid slug: {e}")))?
        }
        None => {
            Slug::derive(&name).map_err(|e| AppError::BadRequest(format!("invalid name: {e}")))?
        }
    };

    Ok(ProductInput {
        name,
        slug,
        description: body.description,
        price: body.price,
        cost_price: body.cost_price,
        stock: body.stock,
        images: body.images,
        category_id: body.category_id,
        featured: body.featured,
    })
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.backend().list_products().await?))
}

/// `GET /api/products/{id}`
#[instrument(skip(state), fields(product_id = %id))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.backend().get_product(id).await?))
}

/// `POST /api/products`
#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = resolve_input(body)?;
    let product = state.backend().create_product(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` - full replacement.
#[instrument(skip(state, body), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>> {
    let input = resolve_input(body)?;
    Ok(Json(state.backend().update_product(id, &input).await?))
}

/// `DELETE /api/products/{id}`
///
/// Deletes the row only. Order items referencing it keep their snapshots.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<StatusCode> {
    state.backend().delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(name: &str, slug: Option<&str>) -> ProductBody {
        ProductBody {
            name: name.to_string(),
            slug: slug.map(ToString::to_string),
            description: None,
            price: Decimal::from(45_000),
            cost_price: None,
            stock: 5,
            images: vec![],
            category_id: CategoryId::generate(),
            featured: false,
        }
    }

    #[test]
    fn slug_is_derived_from_name_when_absent() {
        let input = resolve_input(body("Mate Imperial Torpedo", None)).unwrap();
        assert_eq!(input.slug.as_str(), "mate-imperial-torpedo");
    }

    #[test]
    fn explicit_slug_wins() {
        let input = resolve_input(body("Mate Imperial Torpedo", Some("imperial"))).unwrap();
        assert_eq!(input.slug.as_str(), "imperial");
    }

    #[test]
    fn invalid_explicit_slug_is_rejected() {
        let err = resolve_input(body("Mate", Some("Not A Slug"))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = resolve_input(body("   ", None)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut b = body("Mate", None);
        b.price = Decimal::ZERO;
        assert!(matches!(resolve_input(b).unwrap_err(), AppError::BadRequest(_)));
    }
}
