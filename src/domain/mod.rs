//! Domain layer - Core business logic and entities

pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod rag;

pub use embedding::{
    cosine_similarity, Embedding, EmbeddingInput, EmbeddingProvider, EmbeddingRequest,
    EmbeddingResponse, EmbeddingTask, EmbeddingUsage,
};
pub use error::{DomainError, ProviderFailure};
pub use ingestion::{
    Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy, DocumentMetadata, DocumentParser,
    DocumentType, ParsedDocument, ParserInput,
};
pub use knowledge_base::{
    DocumentInfo, EmbeddingIndex, KnowledgeBase, LoadTicket, PipelineState, PipelineStatus,
    ScoredChunk,
};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
pub use rag::{Answer, AnswerStyle, AnswererConfig, RetrievalAugmentedAnswerer, NO_ANSWER};
