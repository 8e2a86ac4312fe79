//! Supabase REST (PostgREST) client for the public storefront.
//!
//! Uses `reqwest` with the anon key; row-level security on the backend
//! limits what this client can touch. Catalog reads are cached with `moka`
//! (60-second TTL, no invalidation - the TTL is the freshness contract).

mod rows;

pub use rows::{CategoryRow, OrderDetailsRow, OrderRow, ProductRow};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use la_matera_core::{Category, OrderDetails, OrderId, Product};

use crate::backend::{CatalogFilter, NewOrder, NewOrderItem, StorefrontBackend};
use crate::config::SupabaseConfig;

/// PostgREST single-object Accept header. Requests exactly one row; zero
/// rows come back as 406.
const PGRST_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Request timeout for all backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Errors from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("Supabase request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Supabase API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The requested row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A row came back in a shape the domain types reject.
    #[error("corrupt {entity} row {id}: field {field}: {message}")]
    DataCorruption {
        entity: &'static str,
        id: String,
        field: &'static str,
        message: String,
    },
}

impl SupabaseError {
    pub(crate) fn corrupt(
        entity: &'static str,
        id: &str,
        field: &'static str,
        message: &str,
    ) -> Self {
        Self::DataCorruption {
            entity,
            id: id.to_string(),
            field,
            message: message.to_string(),
        }
    }
}

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

/// Client for the Supabase REST API (anon key).
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: String,
    rpc_url: String,
    cache: Cache<String, CacheValue>,
}

impl SupabaseClient {
    /// Create a new client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                rest_url: format!("{}/rest/v1", config.url),
                rpc_url: format!("{}/rest/v1/rpc", config.url),
                cache,
            }),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.inner.rest_url)
    }

    /// Convert a non-success response into an `Api` error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(500)
            .collect::<String>();
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch a single row; a zero-row result becomes `NotFound(what)`.
    async fn fetch_object<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, SupabaseError> {
        let response = self
            .inner
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, PGRST_OBJECT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(SupabaseError::NotFound(what.to_string()));
        }

        Ok(Self::check(response).await?.json::<T>().await?)
    }

    async fn fetch_category_by_slug(&self, slug: &str) -> Result<Category, SupabaseError> {
        let row: CategoryRow = self
            .fetch_object(
                self.table_url("categories"),
                &[
                    ("select", "*".to_string()),
                    ("slug", format!("eq.{slug}")),
                ],
                &format!("category {slug}"),
            )
            .await?;
        row.try_into()
    }
}

#[async_trait::async_trait]
impl StorefrontBackend for SupabaseClient {
    #[instrument(skip(self))]
    async fn list_products(&self, filter: &CatalogFilter) -> Result<Vec<Product>, SupabaseError> {
        let cache_key = format!(
            "products:{}:{}",
            filter.category_slug.as_deref().unwrap_or(""),
            filter.featured_only
        );

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "name.asc".to_string()),
        ];
        if let Some(slug) = &filter.category_slug {
            let category = self.fetch_category_by_slug(slug).await?;
            query.push(("category_id", format!("eq.{}", category.id)));
        }
        if filter.featured_only {
            query.push(("featured", "eq.true".to_string()));
        }

        let response = self
            .inner
            .client
            .get(self.table_url("products"))
            .query(&query)
            .send()
            .await?;
        let rows: Vec<ProductRow> = Self::check(response).await?.json().await?;

        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(slug = %slug))]
    async fn get_product_by_slug(&self, slug: &str) -> Result<Product, SupabaseError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let row: ProductRow = self
            .fetch_object(
                self.table_url("products"),
                &[
                    ("select", "*".to_string()),
                    ("slug", format!("eq.{slug}")),
                ],
                &format!("product {slug}"),
            )
            .await?;
        let product: Product = row.try_into()?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, SupabaseError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response = self
            .inner
            .client
            .get(self.table_url("categories"))
            .query(&[("select", "*"), ("order", "name.asc")])
            .send()
            .await?;
        let rows: Vec<CategoryRow> = Self::check(response).await?.json().await?;

        let categories = rows
            .into_iter()
            .map(Category::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    #[instrument(skip(self, order), fields(customer = %order.customer_name))]
    async fn create_order(
        &self,
        order: &NewOrder,
    ) -> Result<la_matera_core::Order, SupabaseError> {
        let response = self
            .inner
            .client
            .post(self.table_url("orders"))
            .header("Prefer", "return=representation")
            .header(ACCEPT, PGRST_OBJECT)
            .json(order)
            .send()
            .await?;

        let row: OrderRow = Self::check(response).await?.json().await?;
        row.try_into()
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .client
            .post(self.table_url("order_items"))
            .header("Prefer", "return=minimal")
            .json(items)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    async fn decrement_stock(
        &self,
        product_id: la_matera_core::ProductId,
        quantity: u32,
    ) -> Result<(), SupabaseError> {
        // Single-statement decrement on the backend; concurrent checkouts
        // serialize at the database row instead of racing a read-then-write.
        let response = self
            .inner
            .client
            .post(format!("{}/decrement_stock", self.inner.rpc_url))
            .json(&serde_json::json!({
                "p_product_id": product_id,
                "p_quantity": quantity,
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order_details(&self, id: OrderId) -> Result<OrderDetails, SupabaseError> {
        let row: OrderDetailsRow = self
            .fetch_object(
                self.table_url("orders"),
                &[
                    (
                        "select",
                        "*,order_items(quantity,unit_price,products(name,images))".to_string(),
                    ),
                    ("id", format!("eq.{id}")),
                ],
                &format!("order {id}"),
            )
            .await?;
        row.try_into()
    }

    async fn ping(&self) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .client
            .get(self.table_url("categories"))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
