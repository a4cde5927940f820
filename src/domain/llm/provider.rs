use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for generation providers (Gemini, OpenAI, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Model used when none is configured
    fn default_model(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::llm::Message;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&LlmRequest) -> String + Send + Sync>;

    pub struct MockLlmProvider {
        name: &'static str,
        responder: Option<Responder>,
        error: Option<String>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl std::fmt::Debug for MockLlmProvider {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockLlmProvider")
                .field("name", &self.name)
                .field("error", &self.error)
                .finish()
        }
    }

    impl MockLlmProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                responder: None,
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Always answer with the same text
        pub fn with_response(self, text: impl Into<String>) -> Self {
            let text = text.into();
            self.with_responder(move |_| text.clone())
        }

        /// Compute the answer from the request
        pub fn with_responder(
            mut self,
            responder: impl Fn(&LlmRequest) -> String + Send + Sync + 'static,
        ) -> Self {
            self.responder = Some(Box::new(responder));
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<LlmRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            let text = self.responder.as_ref().map(|r| r(&request));
            self.requests.lock().unwrap().push(request);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.name, error));
            }

            let text =
                text.ok_or_else(|| DomainError::provider(self.name, "No mock response configured"))?;

            Ok(LlmResponse::new(
                "mock-response".to_string(),
                model.to_string(),
                Message::assistant(text),
            ))
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }

        fn default_model(&self) -> &'static str {
            "mock-model"
        }
    }
}
