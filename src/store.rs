use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, RelocaleError};
use crate::schema::CollectionSchema;

/// Document persistence owned by the host system
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document in one locale; `None` when it does not exist
    async fn find_by_id(&self, collection: &str, id: &str, locale: &str) -> Result<Option<Value>>;

    /// Write a document under `locale`
    async fn update(&self, collection: &str, id: &str, locale: &str, data: Value) -> Result<()>;

    /// Field schema of a collection
    async fn collection_schema(&self, collection: &str) -> Result<CollectionSchema>;
}

/// File-backed store: `documents_dir/<collection>/<id>/<locale>.json`
/// and `schemas_dir/<collection>.json`
pub struct FsDocumentStore {
    documents_dir: PathBuf,
    schemas_dir: PathBuf,
}

impl FsDocumentStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            documents_dir: config.documents_dir.clone(),
            schemas_dir: config.schemas_dir.clone(),
        }
    }

    fn document_dir(&self, collection: &str, id: &str) -> Result<PathBuf> {
        check_path_component(collection)?;
        check_path_component(id)?;
        Ok(self.documents_dir.join(collection).join(id))
    }

    fn document_path(&self, collection: &str, id: &str, locale: &str) -> Result<PathBuf> {
        check_path_component(locale)?;
        Ok(self.document_dir(collection, id)?.join(format!("{}.json", locale)))
    }

    /// Value of `key` in any existing locale of the document
    async fn existing_field(&self, dir: &Path, key: &str) -> Option<Value> {
        let mut entries = fs::read_dir(dir).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let Ok(content) = fs::read_to_string(entry.path()).await else {
                continue;
            };
            if let Some(value) = serde_json::from_str::<Value>(&content)
                .ok()
                .and_then(|doc| doc.get(key).cloned())
            {
                return Some(value);
            }
        }
        None
    }
}

fn check_path_component(part: &str) -> Result<()> {
    if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\']) {
        return Err(RelocaleError::Validation(format!("Invalid path component: '{}'", part)));
    }
    Ok(())
}

/// `id` as stored by other locales, or numeric when it looks like one
fn id_value(id: &str, existing: Option<Value>) -> Value {
    match existing {
        Some(value) if value.as_str() == Some(id) || value.to_string() == id => value,
        _ => match id.parse::<u64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(id.to_string()),
        },
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn find_by_id(&self, collection: &str, id: &str, locale: &str) -> Result<Option<Value>> {
        let path = self.document_path(collection, id, locale)?;
        if !fs::try_exists(&path).await? {
            debug!("No document at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn update(&self, collection: &str, id: &str, locale: &str, data: Value) -> Result<()> {
        let dir = self.document_dir(collection, id)?;
        let path = self.document_path(collection, id, locale)?;
        let Value::Object(mut map) = data else {
            return Err(RelocaleError::Validation("Document data must be an object".to_string()));
        };

        if !map.contains_key("createdAt") {
            let created_at = self.existing_field(&dir, "createdAt").await;
            map.insert(
                "createdAt".to_string(),
                created_at.unwrap_or_else(|| Value::String(now_timestamp())),
            );
        }
        let existing_id = self.existing_field(&dir, "id").await;
        map.insert("id".to_string(), id_value(id, existing_id));
        map.insert("updatedAt".to_string(), Value::String(now_timestamp()));

        fs::create_dir_all(&dir).await?;
        fs::write(&path, serde_json::to_string_pretty(&Value::Object(map))?).await?;

        info!("Saved {}/{} ({}) to {}", collection, id, locale, path.display());
        Ok(())
    }

    async fn collection_schema(&self, collection: &str) -> Result<CollectionSchema> {
        check_path_component(collection)?;
        let path = self.schemas_dir.join(format!("{}.json", collection));
        if !fs::try_exists(&path).await? {
            return Err(RelocaleError::CollectionNotFound(collection.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        CollectionSchema::from_json(&content)
    }
}
