//! Public catalog endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use la_matera_core::{CategoryId, Product, ProductId, Slug};

use crate::backend::CatalogFilter;
use crate::error::Result;
use crate::state::AppState;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Category slug filter.
    pub category: Option<String>,
    /// Only featured products when `true`.
    #[serde(default)]
    pub featured: bool,
}

/// A product as exposed publicly. `cost_price` is internal and deliberately
/// absent from this shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub category_id: Option<CategoryId>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for PublicProduct {
    fn from(product: Product) -> Self {
        Self {
            in_stock: product.in_stock(),
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price,
            stock: product.stock,
            images: product.images,
            category_id: product.category_id,
            featured: product.featured,
            created_at: product.created_at,
        }
    }
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PublicProduct>>> {
    let filter = CatalogFilter {
        category_slug: params.category,
        featured_only: params.featured,
    };

    let products = state.backend().list_products(&filter).await?;
    Ok(Json(products.into_iter().map(PublicProduct::from).collect()))
}

/// `GET /api/products/{slug}`
#[instrument(skip(state), fields(slug = %slug))]
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicProduct>> {
    let product = state.backend().get_product_by_slug(&slug).await?;
    Ok(Json(product.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use la_matera_core::uuid_from_u128;

    use super::*;

    #[test]
    fn public_product_hides_cost_price() {
        let product = Product {
            id: ProductId::new(uuid_from_u128(1)),
            name: "Mate Imperial Torpedo".to_string(),
            slug: Slug::parse("mate-imperial-torpedo").unwrap(),
            description: None,
            price: Decimal::from(45_000),
            cost_price: Some(Decimal::from(21_000)),
            stock: 3,
            images: vec!["a.jpg".to_string()],
            category_id: None,
            featured: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(PublicProduct::from(product)).unwrap();
        assert!(json.get("costPrice").is_none());
        assert!(json.get("cost_price").is_none());
        assert_eq!(json["inStock"], true);
        assert_eq!(json["stock"], 3);
    }
}
