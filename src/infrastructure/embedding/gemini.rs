//! Google Gemini embedding provider

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingTask,
    EmbeddingUsage,
};
use crate::domain::{DomainError, ProviderFailure};
use crate::infrastructure::llm::DEFAULT_GEMINI_BASE_URL;

pub const DEFAULT_GEMINI_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Gemini `batchEmbedContents` provider.
///
/// Every request goes through the batch endpoint, with the retrieval task
/// hint mapped onto `taskType`.
#[derive(Debug)]
pub struct GeminiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GeminiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn batch_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:batchEmbedContents",
            self.base_url,
            bare_model_name(model)
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let model = format!("models/{}", bare_model_name(request.model()));

        let requests: Vec<serde_json::Value> = request
            .inputs()
            .into_iter()
            .map(|text| {
                let mut entry = serde_json::json!({
                    "model": model,
                    "content": { "parts": [{ "text": text }] },
                });

                if let Some(task) = request.task() {
                    entry["taskType"] = serde_json::json!(task_type(task));
                }

                if let Some(dims) = request.dimensions() {
                    entry["outputDimensionality"] = serde_json::json!(dims);
                }

                entry
            })
            .collect();

        serde_json::json!({ "requests": requests })
    }

    fn parse_response(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: GeminiBatchResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider_failure(
                "gemini",
                ProviderFailure::InvalidResponse,
                format!("Failed to parse embedding response: {}", e),
            )
        })?;

        // the batch endpoint returns vectors in request order without indices
        let embeddings = response
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(index, e)| Embedding::new(index, e.values))
            .collect();

        Ok(EmbeddingResponse::new(
            model.to_string(),
            embeddings,
            EmbeddingUsage::default(),
        ))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for GeminiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.batch_url(request.model());
        let body = self.build_request(&request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(request.model(), response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_GEMINI_EMBEDDING_MODEL
    }
}

fn bare_model_name(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

fn task_type(task: EmbeddingTask) -> &'static str {
    match task {
        EmbeddingTask::RetrievalDocument => "RETRIEVAL_DOCUMENT",
        EmbeddingTask::RetrievalQuery => "RETRIEVAL_QUERY",
    }
}

#[derive(Debug, Deserialize)]
struct GeminiBatchResponse {
    #[serde(default)]
    embeddings: Vec<GeminiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:batchEmbedContents";

    #[tokio::test]
    async fn test_batch_embed() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            json!({ "embeddings": [{ "values": [0.1, 0.2] }, { "values": [0.3, 0.4] }] }),
        );
        let provider = GeminiEmbeddingProvider::new(client, "g-key");

        let request = EmbeddingRequest::batch("text-embedding-004", vec!["a".into(), "b".into()])
            .with_task(EmbeddingTask::RetrievalDocument);
        let response = provider.embed(request).await.unwrap();

        let vectors = response.into_ordered_vectors(2).unwrap();
        assert_eq!(vectors[1], vec![0.3, 0.4]);

        let sent = provider.client.last_request().unwrap();
        assert_eq!(sent.header("x-goog-api-key"), Some("g-key"));
        assert_eq!(sent.body["requests"][0]["model"], "models/text-embedding-004");
        assert_eq!(sent.body["requests"][1]["content"]["parts"][0]["text"], "b");
        assert_eq!(sent.body["requests"][0]["taskType"], "RETRIEVAL_DOCUMENT");
    }

    #[tokio::test]
    async fn test_query_task_and_prefixed_model() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, json!({ "embeddings": [{ "values": [1.0] }] }));
        let provider = GeminiEmbeddingProvider::new(client, "g-key");

        let request = EmbeddingRequest::single("models/text-embedding-004", "question")
            .with_task(EmbeddingTask::RetrievalQuery);
        provider.embed(request).await.unwrap();

        let sent = provider.client.last_request().unwrap();
        assert_eq!(sent.url, TEST_URL);
        assert_eq!(sent.body["requests"][0]["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(sent.body["requests"][0]["model"], "models/text-embedding-004");
    }

    #[tokio::test]
    async fn test_short_response_fails_ordering() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, json!({ "embeddings": [{ "values": [1.0] }] }));
        let provider = GeminiEmbeddingProvider::new(client, "g-key");

        let request =
            EmbeddingRequest::batch("text-embedding-004", vec!["a".into(), "b".into()]);
        let response = provider.embed(request).await.unwrap();

        assert!(response.into_ordered_vectors(2).is_err());
    }

    #[tokio::test]
    async fn test_malformed_response_is_invalid_response() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, json!({ "embeddings": [{ "vector": [1.0] }] }));
        let provider = GeminiEmbeddingProvider::new(client, "g-key");

        let err = provider
            .embed(EmbeddingRequest::single("text-embedding-004", "x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Provider {
                kind: ProviderFailure::InvalidResponse,
                ..
            }
        ));
    }
}
