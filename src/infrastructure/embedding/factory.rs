use std::sync::Arc;

use super::{GeminiEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::llm::{ProviderConnection, ProviderKind};

/// Factory for creating embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Create an embedding provider for the connection
    pub fn create(
        connection: &ProviderConnection,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let client = connection.http_client()?;
        let api_key = connection.api_key.clone();

        let provider: Arc<dyn EmbeddingProvider> = match (connection.kind, &connection.base_url) {
            (ProviderKind::Gemini, Some(url)) => {
                Arc::new(GeminiEmbeddingProvider::with_base_url(client, api_key, url))
            }
            (ProviderKind::Gemini, None) => Arc::new(GeminiEmbeddingProvider::new(client, api_key)),
            (ProviderKind::OpenAi, Some(url)) => {
                Arc::new(OpenAiEmbeddingProvider::with_base_url(client, api_key, url))
            }
            (ProviderKind::OpenAi, None) => Arc::new(OpenAiEmbeddingProvider::new(client, api_key)),
        };

        Ok(provider)
    }
}
