//! Supabase REST (PostgREST) client for the admin service.
//!
//! Authenticates with the service-role key, so it sees internal fields and
//! bypasses row-level security. No read cache here: staff expect edits to
//! show up immediately.

mod rows;

pub use rows::{CategoryRow, OrderDetailsRow, OrderRow, ProductRow};

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use la_matera_core::{
    Category, Order, OrderDetails, OrderId, OrderStatus, Product, ProductId,
};

use crate::backend::{AdminBackend, NewCategory, ProductInput};
use crate::config::SupabaseConfig;

/// PostgREST single-object Accept header. Requests exactly one row; zero
/// rows come back as 406.
const PGRST_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Request timeout for all backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

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

/// Client for the Supabase REST and storage APIs (service-role key).
#[derive(Clone)]
pub struct AdminSupabaseClient {
    inner: Arc<AdminSupabaseClientInner>,
}

struct AdminSupabaseClientInner {
    client: reqwest::Client,
    rest_url: String,
    storage_url: String,
    public_url: String,
    bucket: String,
}

impl AdminSupabaseClient {
    /// Create a new client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &SupabaseConfig, bucket: &str) -> Self {
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

        Self {
            inner: Arc::new(AdminSupabaseClientInner {
                client,
                rest_url: format!("{}/rest/v1", config.url),
                storage_url: format!("{}/storage/v1/object", config.url),
                public_url: format!("{}/storage/v1/object/public", config.url),
                bucket: bucket.to_string(),
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

    /// Write through PostgREST and read back the stored representation.
    async fn write_object<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let response = request
            .header("Prefer", "return=representation")
            .header(ACCEPT, PGRST_OBJECT)
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl AdminBackend for AdminSupabaseClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, SupabaseError> {
        let response = self
            .inner
            .client
            .get(self.table_url("products"))
            .query(&[("select", "*"), ("order", "name.asc")])
            .send()
            .await?;
        let rows: Vec<ProductRow> = Self::check(response).await?.json().await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, SupabaseError> {
        let row: ProductRow = self
            .fetch_object(
                self.table_url("products"),
                &[("select", "*".to_string()), ("id", format!("eq.{id}"))],
                &format!("product {id}"),
            )
            .await?;
        row.try_into()
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_product(&self, input: &ProductInput) -> Result<Product, SupabaseError> {
        let row: ProductRow = self
            .write_object(self.inner.client.post(self.table_url("products")).json(input))
            .await?;
        row.try_into()
    }

    #[instrument(skip(self, input), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, SupabaseError> {
        let row: ProductRow = self
            .write_object(
                self.inner
                    .client
                    .patch(self.table_url("products"))
                    .query(&[("id", format!("eq.{id}"))])
                    .json(input),
            )
            .await?;
        row.try_into()
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<(), SupabaseError> {
        let response = self
            .inner
            .client
            .delete(self.table_url("products"))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, SupabaseError> {
        let response = self
            .inner
            .client
            .get(self.table_url("categories"))
            .query(&[("select", "*"), ("order", "name.asc")])
            .send()
            .await?;
        let rows: Vec<CategoryRow> = Self::check(response).await?.json().await?;
        rows.into_iter().map(Category::try_from).collect()
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_category(&self, input: &NewCategory) -> Result<Category, SupabaseError> {
        let row: CategoryRow = self
            .write_object(
                self.inner
                    .client
                    .post(self.table_url("categories"))
                    .json(input),
            )
            .await?;
        row.try_into()
    }

    #[instrument(skip(self, bytes), fields(path = %path, size = bytes.len()))]
    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, SupabaseError> {
        let inner = &self.inner;
        let response = inner
            .client
            .post(format!("{}/{}/{path}", inner.storage_url, inner.bucket))
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;

        Ok(format!("{}/{}/{path}", inner.public_url, inner.bucket))
    }

    #[instrument(skip(self))]
    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, SupabaseError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(status) = status {
            query.push(("status", format!("eq.{status}")));
        }

        let response = self
            .inner
            .client
            .get(self.table_url("orders"))
            .query(&query)
            .send()
            .await?;
        let rows: Vec<OrderRow> = Self::check(response).await?.json().await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Order, SupabaseError> {
        let row: OrderRow = self
            .fetch_object(
                self.table_url("orders"),
                &[("select", "*".to_string()), ("id", format!("eq.{id}"))],
                &format!("order {id}"),
            )
            .await?;
        row.try_into()
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

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, SupabaseError> {
        let row: OrderRow = self
            .write_object(
                self.inner
                    .client
                    .patch(self.table_url("orders"))
                    .query(&[("id", format!("eq.{id}"))])
                    .json(&serde_json::json!({ "status": status })),
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
