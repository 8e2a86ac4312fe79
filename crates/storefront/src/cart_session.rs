//! Session-scoped cart handling.
//!
//! The cart itself ([`CartStore`]) is a pure container in the core crate.
//! This wrapper gives each shopper session one cart behind an async mutex,
//! so rapid UI interactions serialize instead of racing the
//! read-modify-persist cycle, and writes the full serialized cart through
//! the [`CartStorage`] boundary after every mutation (serialize-on-write,
//! not transactional).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use la_matera_core::{CartError, CartLine, CartStore, ProductId};

/// Durable cart persistence keyed by session.
///
/// The production storefront keeps carts in the shopper's browser storage;
/// server-side rendering and tests use the in-memory implementation.
#[async_trait::async_trait]
pub trait CartStorage: Send + Sync {
    /// Persist the serialized cart for a session.
    async fn save(&self, session_key: &str, cart_json: String);

    /// Load the serialized cart for a session, if any.
    async fn load(&self, session_key: &str) -> Option<String>;
}

/// In-memory cart storage.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    carts: Mutex<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl CartStorage for MemoryCartStorage {
    async fn save(&self, session_key: &str, cart_json: String) {
        self.carts
            .lock()
            .await
            .insert(session_key.to_string(), cart_json);
    }

    async fn load(&self, session_key: &str) -> Option<String> {
        self.carts.lock().await.get(session_key).cloned()
    }
}

/// One shopper's cart, serialized behind a mutex.
pub struct CartSession {
    session_key: String,
    cart: Mutex<CartStore>,
    storage: Arc<dyn CartStorage>,
}

impl CartSession {
    /// Open the cart for a session, restoring persisted state when present.
    ///
    /// A cart that fails to deserialize is discarded and replaced with an
    /// empty one; losing a corrupt cart beats failing every page load.
    pub async fn open(session_key: impl Into<String>, storage: Arc<dyn CartStorage>) -> Self {
        let session_key = session_key.into();
        let cart = match storage.load(&session_key).await {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|error| {
                tracing::warn!(%session_key, %error, "discarding unreadable persisted cart");
                CartStore::new()
            }),
            None => CartStore::new(),
        };

        Self {
            session_key,
            cart: Mutex::new(cart),
            storage,
        }
    }

    /// Add a line (merging with an existing line for the same product).
    #[instrument(skip(self, line), fields(product_id = %line.product_id))]
    pub async fn add_item(&self, line: CartLine) {
        let mut cart = self.cart.lock().await;
        cart.add_item(line);
        self.persist(&cart).await;
    }

    /// Set the absolute quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Propagates [`CartError`] from the underlying cart; the cart is only
    /// persisted when the mutation succeeded.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        let mut cart = self.cart.lock().await;
        cart.update_quantity(product_id, quantity)?;
        self.persist(&cart).await;
        Ok(())
    }

    /// Remove a line unconditionally.
    pub async fn remove_item(&self, product_id: ProductId) {
        let mut cart = self.cart.lock().await;
        cart.remove_item(product_id);
        self.persist(&cart).await;
    }

    /// Empty the cart. Called once, after checkout success.
    pub async fn clear(&self) {
        let mut cart = self.cart.lock().await;
        cart.clear();
        self.persist(&cart).await;
    }

    /// Snapshot the current cart state.
    pub async fn snapshot(&self) -> CartStore {
        self.cart.lock().await.clone()
    }

    async fn persist(&self, cart: &CartStore) {
        match serde_json::to_string(cart) {
            Ok(json) => self.storage.save(&self.session_key, json).await,
            Err(error) => {
                tracing::error!(session_key = %self.session_key, %error, "failed to serialize cart");
            }
        }
    }
}
