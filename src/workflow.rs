use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

use crate::apply::{ApplyReport, Reinserter};
use crate::config::Config;
use crate::error::{Result, RelocaleError};
use crate::extract::{texts, Extractor};
use crate::store::DocumentStore;
use crate::translate::{validate_locale, TranslationProvider};

/// Document identifier as sent by clients: numeric or string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(u64),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Number(n) => write!(f, "{}", n),
            DocumentId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub collection: String,
    pub document_id: DocumentId,
    pub source_locale: String,
    #[serde(default)]
    pub target_locales: Vec<String>,
    /// Single-locale form of `target_locales`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_locale: Option<String>,
}

impl TranslateRequest {
    pub fn new(collection: &str, document_id: &str, source_locale: &str, target_locales: Vec<String>) -> Self {
        Self {
            collection: collection.to_string(),
            document_id: DocumentId::Text(document_id.to_string()),
            source_locale: source_locale.to_string(),
            target_locales,
            target_locale: None,
        }
    }

    /// Requested target locales in order, without duplicates
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for locale in self.target_locales.iter().chain(self.target_locale.iter()) {
            if !targets.contains(locale) {
                targets.push(locale.clone());
            }
        }
        targets
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_fields: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_locales: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslateResponse {
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message: None,
            translated_fields: None,
            translated_locales: None,
            error: Some(message),
        }
    }
}

/// Result of translating one document into one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleOutcome {
    pub locale: String,
    pub report: ApplyReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    /// Fragments extracted from the source document
    pub fragments: usize,
    pub locales: Vec<LocaleOutcome>,
}

impl TranslationSummary {
    /// Fragments actually rewritten, over all locales
    pub fn translated_fields(&self) -> usize {
        self.locales.iter().map(|l| l.report.applied).sum()
    }

    pub fn into_response(self) -> TranslateResponse {
        let message = if self.fragments == 0 {
            "No translatable fields found".to_string()
        } else {
            format!(
                "Successfully translated {} field(s) into {} locale(s)",
                self.translated_fields(),
                self.locales.len()
            )
        };

        TranslateResponse {
            success: true,
            message: Some(message),
            translated_fields: Some(self.translated_fields()),
            translated_locales: Some(self.locales.len()),
            error: None,
        }
    }
}

/// Fetch, extract, translate, reinsert and save, one target locale at a time
pub struct Workflow {
    config: Config,
    store: Box<dyn DocumentStore>,
    provider: Box<dyn TranslationProvider>,
    extractor: Extractor,
    reinserter: Reinserter,
}

impl Workflow {
    pub fn new(
        config: Config,
        store: Box<dyn DocumentStore>,
        provider: Box<dyn TranslationProvider>,
    ) -> Self {
        let extractor = Extractor::new(&config.engine);
        let reinserter = Reinserter::new(&config.engine);
        Self {
            config,
            store,
            provider,
            extractor,
            reinserter,
        }
    }

    /// Handle one request, turning every failure into a structured response
    pub async fn translate_document(&self, request: &TranslateRequest) -> TranslateResponse {
        match self.run(request).await {
            Ok(summary) => summary.into_response(),
            Err(e) => {
                error!("Translation error: {}", e);
                TranslateResponse::failure(e.to_string())
            }
        }
    }

    /// Translate a document into every requested locale.
    ///
    /// A provider failure stops the batch; locales saved before it stay saved.
    pub async fn run(&self, request: &TranslateRequest) -> Result<TranslationSummary> {
        let targets = self.validate(request)?;
        let collection = request.collection.as_str();
        let id = request.document_id.to_string();
        let source = request.source_locale.as_str();

        info!(
            "Translating {}/{} from {} into {:?} with {}",
            collection, id, source, targets, self.provider.provider_name()
        );

        let document = self
            .store
            .find_by_id(collection, &id, source)
            .await?
            .ok_or_else(|| RelocaleError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.clone(),
                locale: source.to_string(),
            })?;
        let schema = self.store.collection_schema(collection).await?;

        let fields = self.extractor.extract(&schema.fields, &document);
        let mut summary = TranslationSummary {
            fragments: fields.len(),
            locales: Vec::new(),
        };

        if fields.is_empty() {
            info!("No translatable fields found in {}/{}", collection, id);
            return Ok(summary);
        }

        let source_texts = texts(&fields);

        for target in &targets {
            info!("Translating {} fragment(s) to {}", fields.len(), target);

            let translations = match self.provider.translate(&source_texts, source, target).await {
                Ok(translations) => translations,
                Err(e) => {
                    if !summary.locales.is_empty() {
                        warn!(
                            "Aborting at {}; {} locale(s) were already saved",
                            target,
                            summary.locales.len()
                        );
                    }
                    return Err(e);
                }
            };

            let applied = self.reinserter.apply(&document, &fields, &translations);
            let mut translated = applied.document;
            self.reinserter.strip_managed_fields(&mut translated);

            self.store.update(collection, &id, target, translated).await?;

            info!(
                "Completed {}: {} of {} fragment(s) translated",
                target, applied.report.applied, applied.report.fields
            );
            summary.locales.push(LocaleOutcome {
                locale: target.clone(),
                report: applied.report,
            });
        }

        Ok(summary)
    }

    fn validate(&self, request: &TranslateRequest) -> Result<Vec<String>> {
        if self.config.disabled {
            return Err(RelocaleError::Validation("Translation is disabled".to_string()));
        }
        if request.collection.trim().is_empty() || request.document_id.to_string().trim().is_empty() {
            return Err(RelocaleError::Validation("Missing required fields".to_string()));
        }
        if !self.config.is_collection_enabled(&request.collection) {
            return Err(RelocaleError::CollectionNotEnabled(request.collection.clone()));
        }

        validate_locale(&request.source_locale)?;

        let targets = request.targets();
        if targets.is_empty() {
            return Err(RelocaleError::Validation("No target locales given".to_string()));
        }
        for target in &targets {
            validate_locale(target)?;
            if *target == request.source_locale {
                return Err(RelocaleError::Validation(format!(
                    "Target locale {} is the source locale",
                    target
                )));
            }
        }

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsDocumentStore;
    use crate::config::StoreConfig;
    use crate::translate::{MockMode, MockProvider, MockTranslationProvider};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{
        "slug": "posts",
        "fields": [
            {"name": "title", "type": "text", "localized": true},
            {"name": "excerpt", "type": "textarea", "localized": true},
            {"name": "views", "type": "number"}
        ]
    }"#;

    fn seeded_store(document: Value) -> (TempDir, StoreConfig) {
        let dir = tempfile::tempdir().unwrap();
        let store_config = StoreConfig {
            documents_dir: dir.path().join("documents"),
            schemas_dir: dir.path().join("schemas"),
        };
        std::fs::create_dir_all(&store_config.schemas_dir).unwrap();
        std::fs::write(store_config.schemas_dir.join("posts.json"), SCHEMA).unwrap();

        let doc_dir = store_config.documents_dir.join("posts").join("1");
        std::fs::create_dir_all(&doc_dir).unwrap();
        std::fs::write(doc_dir.join("en.json"), document.to_string()).unwrap();

        (dir, store_config)
    }

    fn workflow(store_config: &StoreConfig, provider: Box<dyn TranslationProvider>) -> Workflow {
        let mut config = Config::default();
        config.store = store_config.clone();
        Workflow::new(config, Box::new(FsDocumentStore::new(store_config)), provider)
    }

    fn saved(store_config: &StoreConfig, locale: &str) -> Option<Value> {
        let path = store_config.documents_dir.join("posts/1").join(format!("{}.json", locale));
        std::fs::read_to_string(path).ok().map(|s| serde_json::from_str(&s).unwrap())
    }

    fn request(targets: &[&str]) -> TranslateRequest {
        TranslateRequest::new("posts", "1", "en", targets.iter().map(|t| t.to_string()).collect())
    }

    #[tokio::test]
    async fn test_translates_each_locale() {
        let (_dir, store_config) =
            seeded_store(json!({"id": "1", "title": "Hello", "excerpt": "Short", "views": 3}));
        let workflow = workflow(&store_config, Box::new(MockProvider::new(MockMode::Suffix)));

        let response = workflow.translate_document(&request(&["es", "fr"])).await;

        assert!(response.success, "{:?}", response.error);
        assert_eq!(response.translated_fields, Some(4));
        assert_eq!(response.translated_locales, Some(2));

        let es = saved(&store_config, "es").unwrap();
        assert_eq!(es["title"], "Hello_es");
        assert_eq!(es["excerpt"], "Short_es");
        assert_eq!(es["views"], 3);
        assert_eq!(es["id"], "1");
        assert_eq!(saved(&store_config, "fr").unwrap()["title"], "Hello_fr");
        assert_eq!(saved(&store_config, "en").unwrap()["title"], "Hello");
    }

    #[tokio::test]
    async fn test_no_translatable_fields_skips_provider() {
        let (_dir, store_config) = seeded_store(json!({"title": "", "views": 1}));
        let mut provider = MockTranslationProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider.expect_translate().never();

        let response = workflow(&store_config, Box::new(provider))
            .translate_document(&request(&["es"]))
            .await;

        assert!(response.success);
        assert_eq!(response.translated_fields, Some(0));
        assert_eq!(response.message.as_deref(), Some("No translatable fields found"));
        assert!(saved(&store_config, "es").is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_remaining_locales() {
        let (_dir, store_config) = seeded_store(json!({"title": "Hello"}));
        let mut provider = MockTranslationProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider
            .expect_translate()
            .times(2)
            .returning(|texts, _, target| {
                if target == "fr" {
                    Err(RelocaleError::Provider("quota exceeded".to_string()))
                } else {
                    Ok(texts.iter().map(|t| format!("{}!", t)).collect())
                }
            });

        let response = workflow(&store_config, Box::new(provider))
            .translate_document(&request(&["es", "fr", "de"]))
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("quota exceeded"));
        assert_eq!(saved(&store_config, "es").unwrap()["title"], "Hello!");
        assert!(saved(&store_config, "fr").is_none());
        assert!(saved(&store_config, "de").is_none());
    }

    #[tokio::test]
    async fn test_count_mismatch_still_succeeds() {
        let (_dir, store_config) = seeded_store(json!({"title": "Hello", "excerpt": "Short"}));
        let workflow = workflow(&store_config, Box::new(MockProvider::new(MockMode::Truncate(1))));

        let response = workflow.translate_document(&request(&["de"])).await;

        assert!(response.success);
        assert_eq!(response.translated_fields, Some(1));
        let de = saved(&store_config, "de").unwrap();
        assert_eq!(de["title"], "Hello_de");
        assert_eq!(de["excerpt"], "Short");
    }

    #[tokio::test]
    async fn test_missing_document_and_collection() {
        let (_dir, store_config) = seeded_store(json!({"title": "Hello"}));
        let workflow = workflow(&store_config, Box::new(MockProvider::new(MockMode::Suffix)));

        let missing = TranslateRequest::new("posts", "2", "en", vec!["es".to_string()]);
        let response = workflow.translate_document(&missing).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("Document not found"));

        let unknown = TranslateRequest::new("pages", "1", "en", vec!["es".to_string()]);
        assert!(matches!(workflow.run(&unknown).await, Err(RelocaleError::DocumentNotFound { .. })));
    }

    #[tokio::test]
    async fn test_request_validation() {
        let (_dir, store_config) = seeded_store(json!({"title": "Hello"}));
        let workflow = workflow(&store_config, Box::new(MockProvider::new(MockMode::Suffix)));

        assert!(matches!(workflow.run(&request(&[])).await, Err(RelocaleError::Validation(_))));
        assert!(matches!(workflow.run(&request(&["en"])).await, Err(RelocaleError::Validation(_))));
        assert!(matches!(workflow.run(&request(&["e s"])).await, Err(RelocaleError::Validation(_))));

        let blank = TranslateRequest::new("", "1", "en", vec!["es".to_string()]);
        assert!(matches!(workflow.run(&blank).await, Err(RelocaleError::Validation(_))));
    }

    #[tokio::test]
    async fn test_disabled_and_allowlist() {
        let (_dir, store_config) = seeded_store(json!({"title": "Hello"}));

        let mut config = Config::default();
        config.disabled = true;
        let disabled = Workflow::new(
            config,
            Box::new(FsDocumentStore::new(&store_config)),
            Box::new(MockProvider::new(MockMode::Suffix)),
        );
        assert!(!disabled.translate_document(&request(&["es"])).await.success);

        let mut config = Config::default();
        config.collections = vec!["pages".to_string()];
        let restricted = Workflow::new(
            config,
            Box::new(FsDocumentStore::new(&store_config)),
            Box::new(MockProvider::new(MockMode::Suffix)),
        );
        assert!(matches!(
            restricted.run(&request(&["es"])).await,
            Err(RelocaleError::CollectionNotEnabled(_))
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request: TranslateRequest = serde_json::from_value(json!({
            "collection": "posts",
            "documentId": 42,
            "sourceLocale": "en",
            "targetLocales": ["es", "fr"],
            "targetLocale": "es"
        }))
        .unwrap();

        assert_eq!(request.document_id, DocumentId::Number(42));
        assert_eq!(request.document_id.to_string(), "42");
        assert_eq!(request.targets(), vec!["es", "fr"]);

        let legacy: TranslateRequest = serde_json::from_value(json!({
            "collection": "posts", "documentId": "abc", "sourceLocale": "en", "targetLocale": "de"
        }))
        .unwrap();
        assert_eq!(legacy.targets(), vec!["de"]);
    }

    #[test]
    fn test_response_wire_format() {
        let summary = TranslationSummary {
            fragments: 2,
            locales: vec![LocaleOutcome {
                locale: "es".to_string(),
                report: ApplyReport { fields: 2, translations: 2, applied: 2, skipped: 0 },
            }],
        };
        assert_eq!(
            serde_json::to_value(summary.into_response()).unwrap(),
            json!({
                "success": true,
                "message": "Successfully translated 2 field(s) into 1 locale(s)",
                "translatedFields": 2,
                "translatedLocales": 1
            })
        );
        assert_eq!(
            serde_json::to_value(TranslateResponse::failure("boom".to_string())).unwrap(),
            json!({"success": false, "error": "boom"})
        );
    }
}
