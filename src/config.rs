use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, RelocaleError};

// Default values for optional provider settings
fn default_top_p() -> f64 {
    0.95
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_text_node_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Collections translation is enabled for. Empty enables every collection.
    #[serde(default)]
    pub collections: Vec<String>,
    /// Switch the whole translation endpoint off
    #[serde(default)]
    pub disabled: bool,
    pub provider: ProviderConfig,
    pub engine: EngineConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which translation backend to call
    pub kind: ProviderKind,
    /// Base URL of the provider API
    pub endpoint: String,
    /// Model used for translation
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline API key, takes precedence over `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Upper bound on generated tokens per request
    pub max_output_tokens: u32,
    /// HTTP timeout for one provider round-trip
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Google Gemini `generateContent` API
    Gemini,
    /// Local Ollama `/api/generate`
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Field of a block element naming its block variant
    pub discriminator_key: String,
    /// Rich-text container kinds whose direct text children are never translated
    pub protected_node_kinds: Vec<String>,
    /// Rich-text node `type` carrying translatable text
    #[serde(default = "default_text_node_type")]
    pub text_node_type: String,
    /// Host-managed identity and audit attributes removed before persisting
    pub managed_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root of `<collection>/<id>/<locale>.json` documents
    pub documents_dir: PathBuf,
    /// Directory of `<collection>.json` field schemas
    pub schemas_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discriminator_key: "blockType".to_string(),
            protected_node_kinds: vec!["autolink".to_string()],
            text_node_type: default_text_node_type(),
            managed_keys: vec![
                "id".to_string(),
                "createdAt".to_string(),
                "updatedAt".to_string(),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collections: Vec::new(),
            disabled: false,
            provider: ProviderConfig {
                kind: ProviderKind::Gemini,
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.0-flash".to_string(),
                api_key_env: "GEMINI_API_KEY".to_string(),
                api_key: None,
                temperature: 0.1,
                top_p: default_top_p(),
                max_output_tokens: 8192,
                timeout_secs: default_timeout_secs(),
            },
            engine: EngineConfig::default(),
            store: StoreConfig {
                documents_dir: PathBuf::from(".relocale/documents"),
                schemas_dir: PathBuf::from(".relocale/schemas"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelocaleError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RelocaleError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RelocaleError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RelocaleError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Whether translation requests may target `collection`
    pub fn is_collection_enabled(&self, collection: &str) -> bool {
        self.collections.is_empty() || self.collections.iter().any(|c| c == collection)
    }
}

impl ProviderConfig {
    /// Resolve the API key from the inline value or the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                RelocaleError::Config(format!(
                    "Translation API key not configured (set {} or provider.api_key)",
                    self.api_key_env
                ))
            })
    }
}
