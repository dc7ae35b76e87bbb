use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::{Result, RelocaleError};
use super::{TranslationProvider, common::{build_translation_prompt, parse_translation_response}};

// Keeps the key out of request URLs, which end up in error messages and logs
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    /// Text of the first part that has one; thinking models may emit other parts first
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

/// Google Gemini `generateContent` provider
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn model_url(&self, suffix: &str) -> String {
        format!(
            "{}/models/{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            suffix
        )
    }

    pub fn build_request(&self, prompt: String) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        }
    }
}

#[async_trait]
impl TranslationProvider for GeminiProvider {
    async fn translate(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_translation_prompt(texts, source_locale, target_locale);
        let request = self.build_request(prompt);
        let url = self.model_url(":generateContent");

        debug!("Sending {} text(s) to Gemini model {}", texts.len(), self.config.model);

        let response = self.client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RelocaleError::Provider(format!("HTTP request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RelocaleError::Provider(format!(
                "Gemini API error {}: {}", status, error_text
            )));
        }

        let result: GenerateContentResponse = response.json().await
            .map_err(|e| RelocaleError::Provider(format!("Failed to parse response: {}", e.without_url())))?;

        let generated = result.first_text().ok_or_else(|| {
            RelocaleError::Provider("No translation returned from Gemini".to_string())
        })?;

        debug!("Raw Gemini response: {}", generated);

        parse_translation_response(generated, texts.len())
    }

    async fn check_availability(&self) -> Result<()> {
        let response = self.client
            .get(self.model_url(""))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| RelocaleError::Provider(format!("Failed to connect to Gemini: {}", e.without_url())))?;

        if response.status().is_success() {
            info!("Gemini model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(RelocaleError::Provider(format!(
                "Gemini model '{}' is not available: HTTP {}",
                self.config.model,
                response.status()
            )))
        }
    }

    fn provider_name(&self) -> &'static str {
        "Gemini"
    }
}
