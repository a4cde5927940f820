//! docqa - question answering over a single document
//!
//! Upload a PDF, DOCX or text file; its text is extracted, chunked and
//! embedded into an in-memory index. Questions are answered by retrieving
//! the closest chunks and asking a generation model to answer from them
//! only, with a fixed reply when the document does not contain the answer.
//!
//! Embedding and generation go through Google Gemini or any
//! OpenAI-compatible API.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use tracing::info;

use domain::rag::{AnswererConfig, RetrievalAugmentedAnswerer};
use domain::DomainError;
use infrastructure::embedding::EmbeddingProviderFactory;
use infrastructure::llm::LlmProviderFactory;
use infrastructure::services::DocumentQaService;

/// Build the document QA service from configuration.
///
/// Fails when the configuration is invalid or no API key is available.
pub fn create_service(config: &AppConfig) -> Result<DocumentQaService, DomainError> {
    config.validate()?;

    let api_key = config.provider.resolve_api_key()?;
    let connection = config.provider.connection(api_key);

    let embedder = EmbeddingProviderFactory::create(&connection)?;
    let generator = LlmProviderFactory::create(&connection)?;

    let answerer_config = AnswererConfig::new(
        config.provider.embedding_model(),
        config.provider.generation_model(),
    )
    .with_top_k(config.retrieval.top_k)
    .with_min_similarity(config.retrieval.min_similarity)
    .with_temperature(config.provider.temperature);

    info!(
        provider = %connection.kind,
        embedding_model = %answerer_config.embedding_model,
        generation_model = %answerer_config.generation_model,
        top_k = answerer_config.top_k,
        "Providers configured"
    );

    let answerer = RetrievalAugmentedAnswerer::new(embedder, generator, answerer_config);

    Ok(DocumentQaService::new(answerer, config.chunking.clone())?
        .with_batch_size(config.retrieval.embedding_batch_size))
}
