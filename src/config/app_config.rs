use std::time::Duration;

use serde::Deserialize;

use crate::domain::ingestion::ChunkingConfig;
use crate::domain::knowledge_base::{DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_TOP_K};
use crate::domain::DomainError;
use crate::infrastructure::embedding::{
    DEFAULT_GEMINI_EMBEDDING_MODEL, DEFAULT_OPENAI_EMBEDDING_MODEL,
};
use crate::infrastructure::llm::{
    ProviderConnection, ProviderKind, RetryPolicy, DEFAULT_GEMINI_CHAT_MODEL,
    DEFAULT_OPENAI_CHAT_MODEL,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub provider: ProviderConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload request body
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Embedding and generation provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Falls back to the provider's API key environment variable
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub embedding_model: Option<String>,
    pub generation_model: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Chunks scoring below this are never used as context
    pub min_similarity: f32,
    pub embedding_batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            api_key: None,
            base_url: None,
            embedding_model: None,
            generation_model: None,
            temperature: 0.7,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_similarity: 0.2,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }
}

impl ProviderConfig {
    pub fn embedding_model(&self) -> &str {
        match (&self.embedding_model, self.kind) {
            (Some(model), _) => model,
            (None, ProviderKind::Gemini) => DEFAULT_GEMINI_EMBEDDING_MODEL,
            (None, ProviderKind::OpenAi) => DEFAULT_OPENAI_EMBEDDING_MODEL,
        }
    }

    pub fn generation_model(&self) -> &str {
        match (&self.generation_model, self.kind) {
            (Some(model), _) => model,
            (None, ProviderKind::Gemini) => DEFAULT_GEMINI_CHAT_MODEL,
            (None, ProviderKind::OpenAi) => DEFAULT_OPENAI_CHAT_MODEL,
        }
    }

    /// Configured key, else the provider's environment variable
    pub fn resolve_api_key(&self) -> Result<String, DomainError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_key
            .clone()
            .or_else(|| lookup(self.kind.api_key_env()))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "No API key for provider '{}': set provider.api_key or {}",
                    self.kind,
                    self.kind.api_key_env()
                ))
            })
    }

    pub fn connection(&self, api_key: String) -> ProviderConnection {
        let mut connection = ProviderConnection::new(self.kind, api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(self.retry.clone());

        if let Some(base_url) = &self.base_url {
            connection = connection.with_base_url(base_url);
        }

        connection
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking.validate()?;

        if self.retrieval.top_k == 0 {
            return Err(DomainError::configuration("retrieval.top_k must be at least 1"));
        }

        if self.retrieval.embedding_batch_size == 0 {
            return Err(DomainError::configuration(
                "retrieval.embedding_batch_size must be at least 1",
            ));
        }

        if !(-1.0..=1.0).contains(&self.retrieval.min_similarity) {
            return Err(DomainError::configuration(
                "retrieval.min_similarity must be between -1 and 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.chunking, ChunkingConfig::new(1000, 200));
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.embedding_model(), "text-embedding-004");
        assert_eq!(config.provider.generation_model(), "gemini-2.0-flash");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9000

            [provider]
            kind = "openai"
            generation_model = "gpt-4o"

            [provider.retry]
            max_retries = 1

            [chunking]
            chunk_size = 500
            "#,
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.generation_model(), "gpt-4o");
        assert_eq!(config.provider.embedding_model(), "text-embedding-3-small");
        assert_eq!(config.provider.retry.max_retries, 1);
        assert_eq!(config.provider.retry.initial_delay_ms, 500);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 200);
    }

    #[test]
    fn test_api_key_resolution() {
        let mut provider = ProviderConfig::default();

        let key = provider
            .resolve_api_key_with(|name| (name == "GOOGLE_API_KEY").then(|| "env-key".into()))
            .unwrap();
        assert_eq!(key, "env-key");

        provider.api_key = Some("configured".into());
        let key = provider.resolve_api_key_with(|_| Some("env-key".into())).unwrap();
        assert_eq!(key, "configured");
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let provider = ProviderConfig {
            api_key: Some("  ".into()),
            ..Default::default()
        };

        let err = provider.resolve_api_key_with(|_| None).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_connection_carries_settings() {
        let provider = ProviderConfig {
            base_url: Some("http://localhost:9999".into()),
            timeout_secs: 5,
            ..Default::default()
        };

        let connection = provider.connection("k".into());
        assert_eq!(connection.base_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(connection.timeout, Duration::from_secs(5));
        assert_eq!(connection.api_key, "k");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.retrieval.embedding_batch_size = 0;
        assert!(config.validate().is_err());
    }
}
