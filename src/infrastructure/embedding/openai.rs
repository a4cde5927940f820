//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::{
    Embedding, EmbeddingInput, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse,
    EmbeddingUsage,
};
use crate::domain::{DomainError, ProviderFailure};
use crate::infrastructure::llm::DEFAULT_OPENAI_BASE_URL;

pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// OpenAI embedding provider.
///
/// The endpoint has no retrieval task hint, so the request task is ignored.
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// Create a new OpenAI embedding provider
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new provider with custom base URL
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let input = match request.input() {
            EmbeddingInput::Single(s) => serde_json::json!(s),
            EmbeddingInput::Batch(v) => serde_json::json!(v),
        };

        let mut body = serde_json::json!({
            "model": request.model(),
            "input": input,
        });

        if let Some(dims) = request.dimensions() {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider_failure(
                "openai",
                ProviderFailure::InvalidResponse,
                format!("Failed to parse embedding response: {}", e),
            )
        })?;

        let embeddings: Vec<Embedding> = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();

        let usage = EmbeddingUsage::new(response.usage.prompt_tokens, response.usage.total_tokens);

        Ok(EmbeddingResponse::new(response.model, embeddings, usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(&request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_OPENAI_EMBEDDING_MODEL
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: String,
    data: Vec<OpenAiEmbeddingData>,
    #[serde(default)]
    usage: OpenAiEmbeddingUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiEmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::EmbeddingTask;
    use crate::infrastructure::llm::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn create_mock_response(num_embeddings: usize, dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..num_embeddings)
            .map(|i| {
                let embedding: Vec<f32> =
                    (0..dimensions).map(|j| (i + j) as f32 * 0.001 + 0.001).collect();
                serde_json::json!({
                    "index": i,
                    "embedding": embedding,
                    "object": "embedding"
                })
            })
            .collect();

        serde_json::json!({
            "model": "text-embedding-3-small",
            "data": data,
            "usage": {
                "prompt_tokens": 10,
                "total_tokens": 10
            }
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1, 1536));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::single("text-embedding-3-small", "Hello world");
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.model(), "text-embedding-3-small");
        assert_eq!(response.embeddings().len(), 1);
        assert_eq!(response.embeddings()[0].dimensions(), 1536);
        assert_eq!(response.usage().prompt_tokens(), 10);
    }

    #[tokio::test]
    async fn test_embed_batch_request_body() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(3, 8));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::batch(
            "text-embedding-3-small",
            vec!["Hello".into(), "World".into(), "Test".into()],
        )
        .with_task(EmbeddingTask::RetrievalDocument);
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.into_ordered_vectors(3).unwrap().len(), 3);

        let sent = provider.client.last_request().unwrap();
        assert_eq!(sent.header("Authorization"), Some("Bearer test-api-key"));
        assert_eq!(sent.body["input"], serde_json::json!(["Hello", "World", "Test"]));
        assert!(sent.body.get("task_type").is_none());
    }

    #[tokio::test]
    async fn test_embed_missing_usage() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"model": "local", "data": [{"index": 0, "embedding": [0.5, 0.5]}]}),
        );
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let response = provider
            .embed(EmbeddingRequest::single("local", "Hello"))
            .await
            .unwrap();

        assert_eq!(response.usage().total_tokens(), 0);
    }

    #[tokio::test]
    async fn test_embed_with_custom_dimensions() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1, 256));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request =
            EmbeddingRequest::single("text-embedding-3-small", "Hello").with_dimensions(256);
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.embeddings()[0].dimensions(), 256);
        assert_eq!(provider.client.last_request().unwrap().body["dimensions"], 256);
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::single("text-embedding-3-small", "Hello");
        let result = provider.embed(request).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/embeddings";
        let client = MockHttpClient::new().with_response(custom_url, create_mock_response(1, 4));
        let provider =
            OpenAiEmbeddingProvider::with_base_url(client, "test-key", "http://localhost:8080");

        let request = EmbeddingRequest::single("text-embedding-3-small", "Test");
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.embeddings().len(), 1);
    }

    #[test]
    fn test_provider_info() {
        let provider = OpenAiEmbeddingProvider::new(MockHttpClient::new(), "test-key");

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.default_model(), "text-embedding-3-small");
    }
}
