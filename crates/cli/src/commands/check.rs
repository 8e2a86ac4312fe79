//! Verify backend connectivity and configuration.

use tracing::{info, warn};

use la_matera_admin::ai::FallbackChain;
use la_matera_admin::backend::AdminBackend;
use la_matera_admin::config::AdminConfig;
use la_matera_admin::supabase::AdminSupabaseClient;

/// Load configuration, probe the backend, and report what is configured.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the backend is
/// unreachable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    info!(url = %config.supabase.url, bucket = %config.storage_bucket, "Configuration loaded");

    let backend = AdminSupabaseClient::new(&config.supabase, &config.storage_bucket);
    backend.ping().await?;
    info!("Backend reachable");

    let categories = backend.list_categories().await?;
    let products = backend.list_products().await?;
    info!(
        categories = categories.len(),
        products = products.len(),
        "Catalog readable"
    );

    if FallbackChain::from_config(&config.ai).is_configured() {
        info!("AI providers configured");
    } else {
        warn!("No AI providers configured; description generation will return 503");
    }

    Ok(())
}
