//! Telegram order notifications.
//!
//! Best-effort by contract: every failure is logged and swallowed by the
//! caller, and missing credentials downgrade to a no-op dispatcher at
//! startup. Nothing here may ever fail an order.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::config::TelegramConfig;

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Notification failures. Informational only; callers log and move on.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(String),
    #[error("notification API error: {0}")]
    Api(String),
}

/// The operator notification seam.
#[async_trait::async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Deliver a formatted order summary to the operator channel.
    async fn notify_new_order(&self, text: &str) -> Result<(), NotifyError>;
}

/// Notifier backed by the Telegram `sendMessage` API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    bot_token: SecretString,
    chat_id: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

/// Subset of the Telegram response we care about.
#[derive(Debug, serde::Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Create a notifier from Telegram credentials.
    #[must_use]
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }
}

#[async_trait::async_trait]
impl OrderNotifier for TelegramNotifier {
    #[instrument(skip(self, text))]
    async fn notify_new_order(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{TELEGRAM_API_BASE}/bot{}/sendMessage",
            self.bot_token.expose_secret()
        );

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let result: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !result.ok {
            return Err(NotifyError::Api(
                result.description.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        debug!("Order notification sent to Telegram");
        Ok(())
    }
}

/// Notifier used when no Telegram credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait::async_trait]
impl OrderNotifier for NoopNotifier {
    async fn notify_new_order(&self, _text: &str) -> Result<(), NotifyError> {
        warn!("Telegram not configured; dropping order notification");
        Ok(())
    }
}

/// Build the notifier matching the configuration.
#[must_use]
pub fn notifier_from_config(
    telegram: Option<&TelegramConfig>,
) -> std::sync::Arc<dyn OrderNotifier> {
    match telegram {
        Some(config) => std::sync::Arc::new(TelegramNotifier::new(config)),
        None => {
            warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set; order notifications disabled");
            std::sync::Arc::new(NoopNotifier)
        }
    }
}
