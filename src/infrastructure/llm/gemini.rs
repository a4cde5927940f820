use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole,
    ProviderFailure, Usage,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_CHAT_MODEL: &str = "gemini-2.0-flash";

/// Google Gemini `generateContent` provider
#[derive(Debug)]
pub struct GeminiProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GeminiProvider<C> {
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

    fn generate_content_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &LlmRequest) -> serde_json::Value {
        let contents: Vec<GeminiContent> = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(GeminiContent::from_domain)
            .collect();

        let mut body = serde_json::json!({ "contents": contents });

        if let Some(system) = request.system_text() {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system }] });
        }

        let mut generation_config = serde_json::Map::new();

        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".into(), serde_json::json!(temp));
        }

        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".into(), serde_json::json!(max_tokens));
        }

        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn parse_response(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<LlmResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider_failure(
                "gemini",
                ProviderFailure::InvalidResponse,
                format!("Failed to parse response: {}", e),
            )
        })?;

        let id = response.response_id.unwrap_or_default();
        let model = response.model_version.unwrap_or_else(|| model.to_string());
        let usage = response
            .usage_metadata
            .map(|u| Usage::new(u.prompt_token_count, u.candidates_token_count));

        let Some(candidate) = response.candidates.into_iter().next() else {
            // a blocked prompt has feedback but no candidates
            if response.prompt_feedback.is_some() {
                return Ok(LlmResponse::new(id, model, Message::assistant(""))
                    .with_finish_reason(FinishReason::ContentFilter));
            }
            return Err(DomainError::provider_failure(
                "gemini",
                ProviderFailure::InvalidResponse,
                "No candidates in response",
            ));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let mut llm_response = LlmResponse::new(id, model, Message::assistant(text));

        if let Some(reason) = candidate.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = usage {
            llm_response = llm_response.with_usage(usage);
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for GeminiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.generate_content_url(model);
        let body = self.build_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(model, response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_GEMINI_CHAT_MODEL
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Error,
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::Assistant => "model",
            _ => "user",
        };

        Self {
            role,
            parts: vec![GeminiPart {
                text: Some(message.content_text().to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<serde_json::Value>,
    model_version: Option<String>,
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

    fn candidate(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 42, "candidatesTokenCount": 7, "totalTokenCount": 49 },
            "modelVersion": "gemini-2.0-flash",
            "responseId": "resp-1"
        })
    }

    #[tokio::test]
    async fn test_gemini_generate() {
        let client = MockHttpClient::new().with_response(TEST_URL, candidate("Paris is the capital."));
        let provider = GeminiProvider::new(client, "g-key");

        let request = LlmRequest::builder().user("Capital of France?").build();
        let response = provider.chat("gemini-2.0-flash", request).await.unwrap();

        assert_eq!(response.content(), "Paris is the capital.");
        assert_eq!(response.id, "resp-1");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 49);
    }

    #[tokio::test]
    async fn test_gemini_request_body() {
        let client = MockHttpClient::new().with_response(TEST_URL, candidate("ok"));
        let provider = GeminiProvider::new(client, "g-key");

        let request = LlmRequest::builder()
            .system("Answer from context only")
            .user("Question?")
            .temperature(0.7)
            .max_tokens(2048)
            .build();
        provider.chat("gemini-2.0-flash", request).await.unwrap();

        let sent = provider.client.last_request().unwrap();
        assert_eq!(sent.header("x-goog-api-key"), Some("g-key"));
        assert_eq!(sent.body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(sent.body["contents"][0]["role"], "user");
        assert_eq!(sent.body["contents"][0]["parts"][0]["text"], "Question?");
        assert_eq!(
            sent.body["systemInstruction"]["parts"][0]["text"],
            "Answer from context only"
        );
        assert_eq!(sent.body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[tokio::test]
    async fn test_gemini_multiple_parts_are_joined() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] } }] }),
        );
        let provider = GeminiProvider::new(client, "g-key");

        let response = provider
            .chat("gemini-2.0-flash", LlmRequest::builder().user("Hi").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "Hello, world");
        assert_eq!(response.model, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_gemini_blocked_prompt_is_empty_answer() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
        );
        let provider = GeminiProvider::new(client, "g-key");

        let response = provider
            .chat("gemini-2.0-flash", LlmRequest::builder().user("Hi").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "");
        assert_eq!(response.finish_reason, Some(FinishReason::ContentFilter));
    }

    #[tokio::test]
    async fn test_gemini_missing_candidates_is_invalid_response() {
        let client = MockHttpClient::new().with_response(TEST_URL, json!({}));
        let provider = GeminiProvider::new(client, "g-key");

        let err = provider
            .chat("gemini-2.0-flash", LlmRequest::builder().user("Hi").build())
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

    #[test]
    fn test_finish_reasons() {
        assert_eq!(parse_finish_reason("STOP"), FinishReason::Stop);
        assert_eq!(parse_finish_reason("MAX_TOKENS"), FinishReason::Length);
        assert_eq!(parse_finish_reason("SAFETY"), FinishReason::ContentFilter);
        assert_eq!(parse_finish_reason("OTHER"), FinishReason::Error);
    }
}
