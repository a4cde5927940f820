use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::gemini::GeminiProvider;
use super::http_client::{HttpClient, DEFAULT_REQUEST_TIMEOUT};
use super::openai::OpenAiProvider;
use super::retry::{RetryPolicy, RetryingHttpClient};
use crate::domain::{DomainError, LlmProvider};

/// Which provider API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Environment variable holding the API key when none is configured
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

/// Everything needed to open a connection to a provider
#[derive(Debug, Clone)]
pub struct ProviderConnection {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Overrides the provider's public endpoint
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ProviderConnection {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            base_url: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Timeout-bounded HTTP client with retries for transient failures
    pub fn http_client(&self) -> Result<RetryingHttpClient<HttpClient>, DomainError> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::configuration(format!(
                "No API key configured for provider '{}'",
                self.kind
            )));
        }

        let client = HttpClient::with_timeout(self.timeout)?;
        Ok(RetryingHttpClient::new(client, self.retry.clone()))
    }
}

/// Factory for creating generation providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a generation provider for the connection
    pub fn create(connection: &ProviderConnection) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let client = connection.http_client()?;
        let api_key = connection.api_key.clone();

        let provider: Arc<dyn LlmProvider> = match (connection.kind, &connection.base_url) {
            (ProviderKind::Gemini, Some(url)) => {
                Arc::new(GeminiProvider::with_base_url(client, api_key, url))
            }
            (ProviderKind::Gemini, None) => Arc::new(GeminiProvider::new(client, api_key)),
            (ProviderKind::OpenAi, Some(url)) => {
                Arc::new(OpenAiProvider::with_base_url(client, api_key, url))
            }
            (ProviderKind::OpenAi, None) => Arc::new(OpenAiProvider::new(client, api_key)),
        };

        Ok(provider)
    }
}
