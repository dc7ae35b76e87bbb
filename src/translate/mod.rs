// Translation providers
//
// The engine only needs one capability from a provider: translate an ordered
// batch of texts and return the same number of texts in the same order.
// - Gemini: Google Gemini generateContent API
// - Ollama: local models through Ollama
// - Mock: deterministic provider for tests

pub mod common;
pub mod gemini;
pub mod mock;
pub mod ollama;

use async_trait::async_trait;

pub use common::*;
pub use gemini::GeminiProvider;
pub use mock::{MockMode, MockProvider};
pub use ollama::OllamaProvider;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::Result;

/// Batch translation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `texts` from `source_locale` to `target_locale`.
    ///
    /// The result is expected to have the same length and order as `texts`;
    /// callers tolerate a different length.
    async fn translate(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<String>>;

    /// Check that the provider is reachable and the model is usable
    async fn check_availability(&self) -> Result<()>;

    /// Name used in logs
    fn provider_name(&self) -> &'static str;
}

/// Factory for creating provider instances
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider based on the configured kind
    pub fn create_provider(config: ProviderConfig) -> Result<Box<dyn TranslationProvider>> {
        match config.kind {
            ProviderKind::Gemini => Ok(Box::new(GeminiProvider::new(config)?)),
            ProviderKind::Ollama => Ok(Box::new(OllamaProvider::new(config)?)),
        }
    }
}
