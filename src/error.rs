use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelocaleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid field schema: {0}")]
    Schema(String),

    #[error("Document not found: {collection}/{id} ({locale})")]
    DocumentNotFound {
        collection: String,
        id: String,
        locale: String,
    },

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Translation is not enabled for collection: {0}")]
    CollectionNotEnabled(String),
}

pub type Result<T> = std::result::Result<T, RelocaleError>;
