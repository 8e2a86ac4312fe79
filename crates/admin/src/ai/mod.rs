//! AI product description generation.
//!
//! Several hosted LLM providers can produce a description; none of them is
//! reliable enough to depend on alone. [`FallbackChain`] shuffles the
//! configured providers and walks them sequentially until one returns
//! non-empty text, bounding each attempt with a timeout.

pub mod providers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::AiConfig;

use providers::{GeminiClient, OpenAiChatClient};

/// Per-provider attempt budget.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// A text generation capability. One implementation per hosted provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Generate text for a prompt. May legally return an empty string;
    /// the chain treats that as a miss, not a success.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// A single provider attempt failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response missing expected text field")]
    MalformedResponse,
}

/// Chain-level failure, distinguishing "nothing to try" from "tried
/// everything".
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("no AI providers configured")]
    NoProvidersConfigured,

    #[error("all AI providers failed")]
    AllProvidersFailed,
}

/// First-success combinator over the configured providers.
pub struct FallbackChain {
    providers: Vec<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl FallbackChain {
    /// Build a chain over explicit providers (used by tests).
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn TextGenerator>>) -> Self {
        Self {
            providers,
            timeout: PROVIDER_TIMEOUT,
        }
    }

    /// Override the per-provider timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the production chain from whichever provider keys are set.
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        let mut providers: Vec<Arc<dyn TextGenerator>> = Vec::new();
        if let Some(key) = &config.groq_api_key {
            providers.push(Arc::new(OpenAiChatClient::groq(key)));
        }
        if let Some(key) = &config.cerebras_api_key {
            providers.push(Arc::new(OpenAiChatClient::cerebras(key)));
        }
        if let Some(key) = &config.gemini_api_key {
            providers.push(Arc::new(GeminiClient::new(key)));
        }
        Self::new(providers)
    }

    /// Whether any provider is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Try providers in shuffled order until one returns non-empty text.
    ///
    /// Shuffling spreads load (and rate-limit pressure) across providers
    /// instead of always hammering the same one first.
    ///
    /// # Errors
    ///
    /// `NoProvidersConfigured` when the chain is empty;
    /// `AllProvidersFailed` when every attempt errored, timed out, or
    /// produced only whitespace.
    #[instrument(skip_all, fields(providers = self.providers.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        if self.providers.is_empty() {
            return Err(GeneratorError::NoProvidersConfigured);
        }

        let mut order: Vec<Arc<dyn TextGenerator>> = self.providers.clone();
        order.shuffle(&mut rand::rng());

        for provider in order {
            match tokio::time::timeout(self.timeout, provider.generate(prompt)).await {
                Ok(Ok(text)) => {
                    let text = text.trim();
                    if text.is_empty() {
                        warn!(provider = provider.name(), "provider returned empty text");
                        continue;
                    }
                    info!(provider = provider.name(), "description generated");
                    return Ok(text.to_string());
                }
                Ok(Err(error)) => {
                    warn!(provider = provider.name(), %error, "provider failed");
                }
                Err(_) => {
                    warn!(provider = provider.name(), "provider timed out");
                }
            }
        }

        Err(GeneratorError::AllProvidersFailed)
    }
}

/// Writing tone for generated descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Premium,
    Moderno,
    Argentino,
    Divertido,
    #[default]
    Cercano,
}

impl Tone {
    /// The tone instruction appended to the prompt.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Premium => "Usá un tono premium y sofisticado, que transmita calidad.",
            Self::Moderno => "Usá un tono moderno y directo, sin vueltas.",
            Self::Argentino => "Usá un tono bien argentino, con voseo y calidez local.",
            Self::Divertido => "Usá un tono divertido y descontracturado.",
            Self::Cercano => "Usá un tono cercano y cálido, como recomendando a un amigo.",
        }
    }
}

/// Build the Spanish description prompt. The opening sentence is a durable
/// format; tooling downstream keys off it.
#[must_use]
pub fn build_description_prompt(
    name: &str,
    category: &str,
    context: Option<&str>,
    tone: Tone,
) -> String {
    let mut prompt = format!(
        "Escribe una descripción atractiva y vendedora para un producto de \
         e-commerce llamado \"{name}\" que pertenece a la categoría \"{category}\"."
    );

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nINFORMACIÓN ADICIONAL DEL PRODUCTO:\n");
        prompt.push_str(context);
    }

    prompt.push_str("\n\n");
    prompt.push_str(tone.instruction());
    prompt.push_str(
        "\n\nLa descripción debe tener 2 o 3 oraciones, sin emojis y sin \
         comillas, lista para publicar.",
    );

    prompt
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct ScriptedProvider {
        name: &'static str,
        result: Result<String, ()>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn ok(name: &'static str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err(()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(|()| ProviderError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn empty_chain_is_not_configured() {
        let chain = FallbackChain::new(vec![]);
        assert_eq!(
            chain.generate("prompt").await.unwrap_err(),
            GeneratorError::NoProvidersConfigured
        );
    }

    #[tokio::test]
    async fn failing_provider_falls_through() {
        let bad = ScriptedProvider::failing("bad");
        let good = ScriptedProvider::ok("good", "Una descripción.");
        let chain = FallbackChain::new(vec![bad.clone(), good.clone()]);

        let text = chain.generate("prompt").await.unwrap();
        assert_eq!(text, "Una descripción.");
    }

    #[tokio::test]
    async fn all_failing_surfaces_exhaustion() {
        let chain = FallbackChain::new(vec![
            ScriptedProvider::failing("a"),
            ScriptedProvider::failing("b"),
        ]);
        assert_eq!(
            chain.generate("prompt").await.unwrap_err(),
            GeneratorError::AllProvidersFailed
        );
    }

    #[tokio::test]
    async fn empty_text_is_a_skip_not_a_success() {
        let empty = ScriptedProvider::ok("empty", "   ");
        let chain = FallbackChain::new(vec![empty.clone()]);
        assert_eq!(
            chain.generate("prompt").await.unwrap_err(),
            GeneratorError::AllProvidersFailed
        );
        assert_eq!(empty.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_provider_gets_one_attempt() {
        let a = ScriptedProvider::failing("a");
        let b = ScriptedProvider::failing("b");
        let chain = FallbackChain::new(vec![a.clone(), b.clone()]);
        let _ = chain.generate("prompt").await;
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prompt_includes_name_category_and_tone() {
        let prompt = build_description_prompt(
            "Mate Imperial Torpedo",
            "Mates",
            Some("Calabaza forrada en cuero"),
            Tone::Argentino,
        );
        assert!(prompt.contains("llamado \"Mate Imperial Torpedo\""));
        assert!(prompt.contains("categoría \"Mates\""));
        assert!(prompt.contains("INFORMACIÓN ADICIONAL DEL PRODUCTO:\nCalabaza forrada en cuero"));
        assert!(prompt.contains("tono bien argentino"));
        assert!(prompt.contains("2 o 3 oraciones"));
    }

    #[test]
    fn prompt_omits_context_block_when_blank() {
        let prompt = build_description_prompt("Termo", "Termos", Some("  "), Tone::default());
        assert!(!prompt.contains("INFORMACIÓN ADICIONAL"));
        assert!(prompt.contains("tono cercano"));
    }

    #[test]
    fn tone_deserializes_lowercase() {
        let tone: Tone = serde_json::from_str("\"premium\"").unwrap();
        assert_eq!(tone, Tone::Premium);
        assert!(serde_json::from_str::<Tone>("\"formal\"").is_err());
    }
}
