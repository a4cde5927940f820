//! Single-document question answering service
//!
//! Owns the pipeline state and runs the upload path (extract, chunk, embed,
//! commit) and the query path against the active knowledge base.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy, DocumentType, ParserInput};
use crate::domain::knowledge_base::{
    DocumentInfo, EmbeddingIndex, KnowledgeBase, LoadTicket, PipelineState, PipelineStatus,
    DEFAULT_EMBEDDING_BATCH_SIZE,
};
use crate::domain::rag::{Answer, RetrievalAugmentedAnswerer};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::{ChunkerFactory, ParserFactory};

const NO_TEXT_MESSAGE: &str =
    "Could not extract text from the document. It may be empty or contain only images.";
const NO_CHUNKS_MESSAGE: &str = "No valid text chunks could be created from the document.";
const NO_DOCUMENT_MESSAGE: &str = "No document has been uploaded yet. Please upload a document first.";

/// Operations exposed to the API and CLI
#[async_trait]
pub trait DocumentQaServiceTrait: Send + Sync + std::fmt::Debug {
    /// Load a document whose type comes from the filename extension
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<DocumentInfo, DomainError>;

    /// Answer a question from the loaded document
    async fn query(&self, question: &str) -> Result<Answer, DomainError>;

    /// Discard the loaded document
    async fn reset(&self);

    async fn status(&self) -> PipelineStatus;
}

/// Document QA service
#[derive(Debug)]
pub struct DocumentQaService {
    state: PipelineState,
    answerer: RetrievalAugmentedAnswerer,
    chunker: Arc<dyn ChunkingStrategy>,
    chunking: ChunkingConfig,
    batch_size: usize,
}

impl DocumentQaService {
    pub fn new(
        answerer: RetrievalAugmentedAnswerer,
        chunking: ChunkingConfig,
    ) -> Result<Self, DomainError> {
        chunking.validate()?;

        Ok(Self {
            state: PipelineState::new(),
            answerer,
            chunker: ChunkerFactory::create(),
            chunking,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        })
    }

    /// Number of chunks sent per embedding request
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Extract, chunk and index a document, replacing the active one.
    ///
    /// The previous document is discarded before any work starts, so every
    /// failure leaves the service without a document.
    pub async fn upload(
        &self,
        name: &str,
        document_type: DocumentType,
        bytes: Vec<u8>,
    ) -> Result<DocumentInfo, DomainError> {
        let started = Instant::now();
        let ticket = self.state.begin_load().await;
        let generation = ticket.generation();

        info!(
            document = name,
            document_type = %document_type,
            bytes = bytes.len(),
            generation,
            "Loading document"
        );

        match self.load(ticket, name, document_type, bytes).await {
            Ok(info) => {
                info!(
                    document = name,
                    chunks = info.chunk_count,
                    generation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Document loaded"
                );
                Ok(info)
            }
            Err(e) => {
                warn!(
                    document = name,
                    generation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Document load failed"
                );
                Err(e)
            }
        }
    }

    async fn load(
        &self,
        ticket: LoadTicket,
        name: &str,
        document_type: DocumentType,
        bytes: Vec<u8>,
    ) -> Result<DocumentInfo, DomainError> {
        let parser = ParserFactory::create(document_type);
        let parsed = parser
            .parse(ParserInput::from_bytes(bytes).with_filename(name))
            .await?;

        if parsed.is_blank() {
            return Err(DomainError::chunking(NO_TEXT_MESSAGE));
        }

        let chunks: Vec<_> = self
            .chunker
            .chunk(&parsed.content, &self.chunking)?
            .into_iter()
            .map(|chunk| chunk.with_source(name))
            .collect();

        if chunks.is_empty() {
            return Err(DomainError::chunking(NO_CHUNKS_MESSAGE));
        }

        let index = EmbeddingIndex::build(
            self.answerer.embedder().as_ref(),
            &self.answerer.config().embedding_model,
            chunks,
            self.batch_size,
        )
        .await?;
        debug!(
            vectors = index.len(),
            dimensions = index.dimensions(),
            "Embedding index built"
        );

        let knowledge_base =
            KnowledgeBase::new(name, document_type, parsed.content.chars().count(), index);
        let info = knowledge_base.info().clone();

        if !self.state.commit(ticket, knowledge_base).await {
            return Err(DomainError::conflict(format!(
                "Loading '{}' was superseded by a newer upload or reset",
                name
            )));
        }

        Ok(info)
    }
}

#[async_trait]
impl DocumentQaServiceTrait for DocumentQaService {
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<DocumentInfo, DomainError> {
        // an upload always discards the old document, even one with a bad extension
        self.state.reset().await;

        let document_type = DocumentType::from_filename(filename)?;
        self.upload(filename, document_type, bytes).await
    }

    async fn query(&self, question: &str) -> Result<Answer, DomainError> {
        let knowledge_base = self
            .state
            .current()
            .await
            .ok_or_else(|| DomainError::precondition(NO_DOCUMENT_MESSAGE))?;

        let started = Instant::now();
        let answer = self.answerer.answer(&knowledge_base, question).await?;

        info!(
            document = knowledge_base.document_name(),
            sources = answer.sources.len(),
            not_found = answer.is_not_found(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(answer)
    }

    async fn reset(&self) {
        self.state.reset().await;
        info!("Pipeline reset");
    }

    async fn status(&self) -> PipelineStatus {
        self.state.status().await
    }
}
