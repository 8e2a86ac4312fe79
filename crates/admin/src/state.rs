//! Application state shared across handlers.

use std::sync::Arc;

use crate::ai::FallbackChain;
use crate::backend::AdminBackend;
use crate::config::AdminConfig;
use crate::images::{CommandTranscoder, ImageTranscoder};
use crate::supabase::AdminSupabaseClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; exposes the storage backend, the AI
/// fallback chain, and the image transcoder.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Arc<dyn AdminBackend>,
    generator: Arc<FallbackChain>,
    transcoder: Arc<dyn ImageTranscoder>,
}

impl AppState {
    /// Create the production state: Supabase backend, configured AI chain,
    /// external transcoder command.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let backend: Arc<dyn AdminBackend> = Arc::new(AdminSupabaseClient::new(
            &config.supabase,
            &config.storage_bucket,
        ));
        let generator = Arc::new(FallbackChain::from_config(&config.ai));
        let transcoder: Arc<dyn ImageTranscoder> =
            Arc::new(CommandTranscoder::new(&config.heic_convert_cmd));
        Self::with_parts(config, backend, generator, transcoder)
    }

    /// Create a state over explicit seam implementations (used by tests).
    #[must_use]
    pub fn with_parts(
        config: AdminConfig,
        backend: Arc<dyn AdminBackend>,
        generator: Arc<FallbackChain>,
        transcoder: Arc<dyn ImageTranscoder>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                generator,
                transcoder,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn backend(&self) -> &dyn AdminBackend {
        self.inner.backend.as_ref()
    }

    /// Get a reference to the AI fallback chain.
    #[must_use]
    pub fn generator(&self) -> &FallbackChain {
        &self.inner.generator
    }

    /// Get a reference to the image transcoder.
    #[must_use]
    pub fn transcoder(&self) -> &dyn ImageTranscoder {
        self.inner.transcoder.as_ref()
    }
}
