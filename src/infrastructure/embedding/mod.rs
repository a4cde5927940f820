//! Embedding provider implementations

mod factory;
mod gemini;
mod openai;

pub use factory::EmbeddingProviderFactory;
pub use gemini::{GeminiEmbeddingProvider, DEFAULT_GEMINI_EMBEDDING_MODEL};
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_OPENAI_EMBEDDING_MODEL};

// Re-export HTTP client for use by embedding providers
pub use super::llm::{HttpClient, HttpClientTrait};
