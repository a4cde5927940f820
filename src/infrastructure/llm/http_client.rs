use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::domain::{DomainError, ProviderFailure};

/// Default timeout for a single provider request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, DomainError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn classify_send_error(error: &reqwest::Error) -> ProviderFailure {
        if error.is_timeout() {
            ProviderFailure::Timeout
        } else if error.is_connect() || error.is_request() {
            ProviderFailure::Network
        } else {
            ProviderFailure::Other
        }
    }

    fn classify_status(status: StatusCode) -> ProviderFailure {
        match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderFailure::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderFailure::Unauthorized,
            s if s.is_server_error() => ProviderFailure::Server,
            _ => ProviderFailure::Other,
        }
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(|e| {
            DomainError::provider_failure(
                "http",
                Self::classify_send_error(&e),
                format!("Request failed: {}", e),
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider_failure(
                "http",
                Self::classify_status(status),
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response.json().await.map_err(|e| {
            let kind = if e.is_timeout() {
                ProviderFailure::Timeout
            } else {
                ProviderFailure::InvalidResponse
            };
            DomainError::provider_failure("http", kind, format!("Failed to parse response: {}", e))
        })
    }
}
