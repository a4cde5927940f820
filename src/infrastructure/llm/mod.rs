//! Generation provider implementations and the shared HTTP plumbing

mod factory;
mod gemini;
mod http_client;
mod openai;
mod retry;

pub use factory::{LlmProviderFactory, ProviderConnection, ProviderKind};
pub use gemini::{GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_CHAT_MODEL};
pub use http_client::{HttpClient, HttpClientTrait, DEFAULT_REQUEST_TIMEOUT};
pub use openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_CHAT_MODEL};
pub use retry::{RetryPolicy, RetryingHttpClient};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
