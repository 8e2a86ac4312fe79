//! Integration test support for La Matera.
//!
//! The services talk to storage through their backend seams; this crate
//! provides [`MemoryBackend`], a single in-memory store implementing both
//! the storefront and admin seams, plus a recording notifier, a stub
//! transcoder, and config/fixture builders. All state lives behind one
//! mutex, so the stock decrement is atomic exactly like the production
//! RPC.

use std::net::IpAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use la_matera_core::{
    CartLine, Category, CategoryId, Order, OrderDetailItem, OrderDetails, OrderId, OrderItem,
    OrderItemId, Product, ProductId, Slug,
};

use la_matera_admin::backend::{AdminBackend, NewCategory, ProductInput};
use la_matera_admin::images::{ImageTranscoder, TranscodeError};
use la_matera_admin::supabase::SupabaseError as AdminError;
use la_matera_storefront::backend::{CatalogFilter, NewOrder, NewOrderItem, StorefrontBackend};
use la_matera_storefront::services::telegram::{NotifyError, OrderNotifier};
use la_matera_storefront::supabase::SupabaseError as StorefrontError;

#[derive(Default)]
struct StoreState {
    products: Vec<Product>,
    categories: Vec<Category>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    uploads: Vec<(String, String, usize)>,
}

/// In-memory storage backend shared by both services' seams.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<StoreState>,
    /// When set, `insert_order_items` fails with an API error.
    pub fail_item_insert: AtomicBool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn insert_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    pub fn insert_category(&self, category: Category) {
        self.lock().categories.push(category);
    }

    /// Insert a pre-built order header (used to backdate listing tests).
    pub fn insert_order(&self, order: Order) {
        self.lock().orders.push(order);
    }

    /// Current stock of a product, panicking if it does not exist.
    ///
    /// # Panics
    ///
    /// Panics when the product is unknown.
    #[must_use]
    pub fn stock_of(&self, id: ProductId) -> i64 {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
            .expect("unknown product")
    }

    /// Overwrite a product's price (for snapshot tests).
    pub fn set_price(&self, id: ProductId, price: Decimal) {
        let mut state = self.lock();
        if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
            product.price = price;
        }
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    #[must_use]
    pub fn items_for(&self, order_id: OrderId) -> Vec<OrderItem> {
        self.lock()
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Recorded uploads as `(path, content_type, size)`.
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.lock().uploads.clone()
    }
}

#[async_trait]
impl StorefrontBackend for MemoryBackend {
    async fn list_products(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<Product>, StorefrontError> {
        let state = self.lock();

        let category_id = match &filter.category_slug {
            Some(slug) => Some(
                state
                    .categories
                    .iter()
                    .find(|c| c.slug.as_str() == slug)
                    .map(|c| c.id)
                    .ok_or_else(|| StorefrontError::NotFound(format!("category {slug}")))?,
            ),
            None => None,
        };

        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter(|p| !filter.featured_only || p.featured)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Product, StorefrontError> {
        self.lock()
            .products
            .iter()
            .find(|p| p.slug.as_str() == slug)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("product {slug}")))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorefrontError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StorefrontError> {
        let stored = Order {
            id: OrderId::generate(),
            created_at: Utc::now(),
            status: order.status,
            total: order.total,
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_address: order.customer_address.clone(),
            metadata: Some(order.metadata.clone()),
        };
        self.lock().orders.push(stored.clone());
        Ok(stored)
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), StorefrontError> {
        if self.fail_item_insert.load(Ordering::SeqCst) {
            return Err(StorefrontError::Api {
                status: 500,
                message: "injected item insert failure".to_string(),
            });
        }

        let mut state = self.lock();
        for item in items {
            state.order_items.push(OrderItem {
                id: OrderItemId::generate(),
                order_id: item.order_id,
                product_id: Some(item.product_id),
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }
        Ok(())
    }

    async fn decrement_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        // One lock for read-modify-write, mirroring the production RPC's
        // single-statement decrement.
        let mut state = self.lock();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("product {product_id}")))?;
        product.stock -= i64::from(quantity);
        Ok(())
    }

    async fn get_order_details(&self, id: OrderId) -> Result<OrderDetails, StorefrontError> {
        let state = self.lock();
        let order = state
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("order {id}")))?;

        let items = state
            .order_items
            .iter()
            .filter(|i| i.order_id == id)
            .map(|item| {
                let product = item
                    .product_id
                    .and_then(|pid| state.products.iter().find(|p| p.id == pid));
                OrderDetailItem {
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    product_name: product.map(|p| p.name.clone()),
                    product_image: product.and_then(|p| p.primary_image().map(ToString::to_string)),
                }
            })
            .collect();

        Ok(OrderDetails { order, items })
    }

    async fn ping(&self) -> Result<(), StorefrontError> {
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for MemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        let mut products = self.lock().products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, AdminError> {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("product {id}")))
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, AdminError> {
        let product = Product {
            id: ProductId::generate(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            price: input.price,
            cost_price: input.cost_price,
            stock: input.stock,
            images: input.images.clone(),
            category_id: Some(input.category_id),
            featured: input.featured,
            created_at: Utc::now(),
        };
        self.lock().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, AdminError> {
        let mut state = self.lock();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AdminError::NotFound(format!("product {id}")))?;

        product.name = input.name.clone();
        product.slug = input.slug.clone();
        product.description = input.description.clone();
        product.price = input.price;
        product.cost_price = input.cost_price;
        product.stock = input.stock;
        product.images = input.images.clone();
        product.category_id = Some(input.category_id);
        product.featured = input.featured;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), AdminError> {
        self.lock().products.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AdminError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, AdminError> {
        let category = Category {
            id: CategoryId::generate(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            created_at: Utc::now(),
        };
        self.lock().categories.push(category.clone());
        Ok(category)
    }

    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AdminError> {
        self.lock()
            .uploads
            .push((path.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("memory://bucket/{path}"))
    }

    async fn list_orders(
        &self,
        status: Option<la_matera_core::OrderStatus>,
    ) -> Result<Vec<Order>, AdminError> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, AdminError> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("order {id}")))
    }

    async fn get_order_details(&self, id: OrderId) -> Result<OrderDetails, AdminError> {
        StorefrontBackend::get_order_details(self, id)
            .await
            .map_err(|_| AdminError::NotFound(format!("order {id}")))
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: la_matera_core::OrderStatus,
    ) -> Result<Order, AdminError> {
        let mut state = self.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AdminError::NotFound(format!("order {id}")))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn ping(&self) -> Result<(), AdminError> {
        Ok(())
    }
}

/// Notifier that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    /// When set, every notification attempt fails.
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn notify_new_order(&self, text: &str) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Api("injected notifier failure".to_string()));
        }
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }
}

/// Transcoder that returns a fixed JPEG payload.
pub struct StubTranscoder;

#[async_trait]
impl ImageTranscoder for StubTranscoder {
    async fn to_jpeg(&self, _bytes: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A catalog product fixture.
///
/// # Panics
///
/// Panics when `name` cannot be turned into a slug.
#[must_use]
pub fn product(name: &str, price: i64, stock: i64) -> Product {
    Product {
        id: ProductId::generate(),
        name: name.to_string(),
        slug: Slug::derive(name).expect("fixture name must be sluggable"),
        description: None,
        price: Decimal::from(price),
        cost_price: None,
        stock,
        images: vec![format!("https://cdn.example.com/{name}.jpg")],
        category_id: None,
        featured: false,
        created_at: Utc::now(),
    }
}

/// A cart line matching a catalog product.
#[must_use]
pub fn cart_line(product: &Product, quantity: u32) -> CartLine {
    CartLine {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        quantity,
        image_url: product.primary_image().map(ToString::to_string),
        known_stock: product.stock,
    }
}

/// An order header fixture, backdated by `age_minutes`.
#[must_use]
pub fn order(status: la_matera_core::OrderStatus, age_minutes: i64) -> Order {
    Order {
        id: OrderId::generate(),
        created_at: Utc::now() - Duration::minutes(age_minutes),
        status,
        total: Decimal::from(45_000),
        customer_name: "Ana García".to_string(),
        customer_email: None,
        customer_phone: Some("+5491144440000".to_string()),
        customer_address: None,
        metadata: None,
    }
}

/// Storefront configuration pointing nowhere (backends are injected).
#[must_use]
pub fn storefront_test_config() -> la_matera_storefront::config::StorefrontConfig {
    la_matera_storefront::config::StorefrontConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        store_name: "La Matera".to_string(),
        whatsapp_number: "5491155550000".to_string(),
        supabase: la_matera_storefront::config::SupabaseConfig {
            url: "http://localhost:54321".to_string(),
            api_key: SecretString::from("k3y-f0r-t3sts-0nly-a8f2c9d1"),
        },
        telegram: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.1,
    }
}

/// Admin configuration pointing nowhere (backends are injected).
#[must_use]
pub fn admin_test_config() -> la_matera_admin::config::AdminConfig {
    la_matera_admin::config::AdminConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        supabase: la_matera_admin::config::SupabaseConfig {
            url: "http://localhost:54321".to_string(),
            api_key: SecretString::from("k3y-f0r-t3sts-0nly-a8f2c9d1"),
        },
        storage_bucket: "product-images".to_string(),
        heic_convert_cmd: "heif-convert".to_string(),
        ai: la_matera_admin::config::AiConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.1,
    }
}
