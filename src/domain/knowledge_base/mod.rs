//! Knowledge base domain: the embedding index over one document and the
//! pipeline state that holds it

mod entity;
mod index;
mod state;

pub use entity::{DocumentInfo, KnowledgeBase};
pub use index::{EmbeddingIndex, ScoredChunk, DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_TOP_K};
pub use state::{LoadTicket, PipelineState, PipelineStatus};
