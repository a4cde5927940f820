//! Retrieval-augmented answering over the active knowledge base
//!
//! Stages run in order and each one is a separate method:
//! embed the question, retrieve the nearest chunks, drop chunks below the
//! relevance floor, assemble the context, generate, then normalize.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompt::{normalize_answer, render_grounded_prompt, AnswerStyle};
use super::Answer;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingTask};
use crate::domain::ingestion::helpers::normalize_whitespace;
use crate::domain::knowledge_base::{KnowledgeBase, ScoredChunk, DEFAULT_TOP_K};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::{DomainError, ProviderFailure};

/// Configuration for the answerer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswererConfig {
    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Retrieved chunks scoring below this are not used as context
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    pub embedding_model: String,
    pub generation_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_concise_max_tokens")]
    pub concise_max_tokens: u32,
    #[serde(default = "default_detailed_max_tokens")]
    pub detailed_max_tokens: u32,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_min_similarity() -> f32 {
    0.2
}

fn default_temperature() -> f32 {
    0.7
}

fn default_concise_max_tokens() -> u32 {
    512
}

fn default_detailed_max_tokens() -> u32 {
    2048
}

impl AnswererConfig {
    pub fn new(embedding_model: impl Into<String>, generation_model: impl Into<String>) -> Self {
        Self {
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            embedding_model: embedding_model.into(),
            generation_model: generation_model.into(),
            temperature: default_temperature(),
            concise_max_tokens: default_concise_max_tokens(),
            detailed_max_tokens: default_detailed_max_tokens(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn max_tokens(&self, style: AnswerStyle) -> u32 {
        match style {
            AnswerStyle::Concise => self.concise_max_tokens,
            AnswerStyle::Detailed => self.detailed_max_tokens,
        }
    }
}

/// Answers questions using only the content of the active knowledge base
#[derive(Debug, Clone)]
pub struct RetrievalAugmentedAnswerer {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn LlmProvider>,
    config: AnswererConfig,
}

impl RetrievalAugmentedAnswerer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn LlmProvider>,
        config: AnswererConfig,
    ) -> Self {
        Self {
            embedder,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &AnswererConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Answer a question from the given knowledge base.
    ///
    /// A question the document cannot answer is a successful [`Answer`]
    /// carrying the sentinel text.
    pub async fn answer(
        &self,
        knowledge_base: &KnowledgeBase,
        question: &str,
    ) -> Result<Answer, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("Question must not be empty"));
        }

        let started = Instant::now();

        let vector = self.embed_question(question).await?;
        let retrieved = self.retrieve(knowledge_base, &vector);
        let relevant = self.relevant(retrieved);

        if relevant.is_empty() {
            info!(
                document = knowledge_base.document_name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "No relevant context for question"
            );
            return Ok(Answer::not_found());
        }

        let context = Self::assemble_context(&relevant);
        let style = AnswerStyle::detect(question);
        let generated = self.generate(&context, question, style).await?;
        let answer = normalize_answer(&generated);

        let sources = relevant
            .iter()
            .map(|scored| normalize_whitespace(&scored.chunk.content))
            .collect();

        info!(
            document = knowledge_base.document_name(),
            context_chunks = relevant.len(),
            style = ?style,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(Answer::new(answer, sources))
    }

    /// Embed the question with the retrieval-query task hint
    pub async fn embed_question(&self, question: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(&self.config.embedding_model, question)
            .with_task(EmbeddingTask::RetrievalQuery);

        let response = self
            .embedder
            .embed(request)
            .await
            .map_err(|e| as_provider_error(self.embedder.provider_name(), e))?;

        let mut vectors = response
            .into_ordered_vectors(1)
            .map_err(|e| as_provider_error(self.embedder.provider_name(), e))?;

        vectors
            .pop()
            .ok_or_else(|| {
                DomainError::provider_failure(
                    self.embedder.provider_name(),
                    ProviderFailure::InvalidResponse,
                    "No embedding returned for question",
                )
            })
    }

    /// Nearest chunks to the question vector, best first
    pub fn retrieve<'a>(
        &self,
        knowledge_base: &'a KnowledgeBase,
        vector: &[f32],
    ) -> Vec<ScoredChunk<'a>> {
        let retrieved = knowledge_base.index().query(vector, self.config.top_k);

        debug!(
            retrieved = retrieved.len(),
            best_score = retrieved.first().map(|s| s.score),
            "Retrieved chunks"
        );

        retrieved
    }

    /// Drop chunks below the relevance floor, keeping rank order
    pub fn relevant<'a>(&self, retrieved: Vec<ScoredChunk<'a>>) -> Vec<ScoredChunk<'a>> {
        retrieved
            .into_iter()
            .filter(|scored| scored.score >= self.config.min_similarity)
            .collect()
    }

    /// Chunk texts in rank order separated by blank lines
    pub fn assemble_context(chunks: &[ScoredChunk<'_>]) -> String {
        chunks
            .iter()
            .map(|scored| scored.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Ask the generation provider for a grounded answer
    pub async fn generate(
        &self,
        context: &str,
        question: &str,
        style: AnswerStyle,
    ) -> Result<String, DomainError> {
        let prompt = render_grounded_prompt(context, question, style);

        let request = LlmRequest::builder()
            .user(prompt)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens(style))
            .build();

        let response = self
            .generator
            .chat(&self.config.generation_model, request)
            .await
            .map_err(|e| as_provider_error(self.generator.provider_name(), e))?;

        Ok(response.content().to_string())
    }
}

/// Query-time failures always surface as provider errors
fn as_provider_error(provider: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Provider { .. } => error,
        other => DomainError::provider_failure(
            provider,
            ProviderFailure::InvalidResponse,
            other.to_string(),
        ),
    }
}
