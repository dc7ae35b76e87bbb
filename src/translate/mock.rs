//! Deterministic provider for exercising the pipeline without network access.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{Result, RelocaleError};
use super::TranslationProvider;

/// How [`MockProvider`] answers
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target locale: "hello" → "hello_fr"
    Suffix,
    /// Look up `(text, target_locale)`, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),
    /// Suffix mode, but drop the last `n` results
    Truncate(usize),
    /// Fail every call whose target locale is in the list
    FailFor(Vec<String>),
    /// Return the input unchanged
    NoOp,
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    mode: MockMode,
}

impl MockProvider {
    pub fn new(mode: MockMode) -> Self {
        Self { mode }
    }

    fn suffix(text: &str, target: &str) -> String {
        format!("{}_{}", text, target)
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate(
        &self,
        texts: &[String],
        _source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<String>> {
        let translations = match &self.mode {
            MockMode::Suffix => texts.iter().map(|t| Self::suffix(t, target_locale)).collect(),
            MockMode::Mappings(map) => texts
                .iter()
                .map(|t| {
                    map.get(&(t.clone(), target_locale.to_string()))
                        .cloned()
                        .unwrap_or_else(|| Self::suffix(t, target_locale))
                })
                .collect(),
            MockMode::Truncate(n) => texts
                .iter()
                .take(texts.len().saturating_sub(*n))
                .map(|t| Self::suffix(t, target_locale))
                .collect(),
            MockMode::FailFor(locales) if locales.iter().any(|l| l == target_locale) => {
                return Err(RelocaleError::Provider(format!(
                    "Mock provider refuses {}",
                    target_locale
                )));
            }
            MockMode::FailFor(_) => texts.iter().map(|t| Self::suffix(t, target_locale)).collect(),
            MockMode::NoOp => texts.to_vec(),
        };
        Ok(translations)
    }

    async fn check_availability(&self) -> Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "Mock"
    }
}
