//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::StorefrontBackend;
use crate::checkout::StoreIdentity;
use crate::config::StorefrontConfig;
use crate::services::telegram::{OrderNotifier, notifier_from_config};
use crate::supabase::SupabaseClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// storage backend, the order notifier, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn StorefrontBackend>,
    notifier: Arc<dyn OrderNotifier>,
    store: StoreIdentity,
}

impl AppState {
    /// Create the production state: Supabase backend, Telegram notifier.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend: Arc<dyn StorefrontBackend> = Arc::new(SupabaseClient::new(&config.supabase));
        let notifier = notifier_from_config(config.telegram.as_ref());
        Self::with_parts(config, backend, notifier)
    }

    /// Create a state over explicit seam implementations (used by tests).
    #[must_use]
    pub fn with_parts(
        config: StorefrontConfig,
        backend: Arc<dyn StorefrontBackend>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        let store = StoreIdentity {
            store_name: config.store_name.clone(),
            whatsapp_number: config.whatsapp_number.clone(),
        };

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                notifier,
                store,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn backend(&self) -> &dyn StorefrontBackend {
        self.inner.backend.as_ref()
    }

    /// Get a reference to the order notifier.
    #[must_use]
    pub fn notifier(&self) -> &dyn OrderNotifier {
        self.inner.notifier.as_ref()
    }

    /// Store identity for the WhatsApp handoff.
    #[must_use]
    pub fn store(&self) -> &StoreIdentity {
        &self.inner.store
    }
}
