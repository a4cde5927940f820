//! Single-slot pipeline state with generation-guarded replacement
//!
//! ```text
//!            begin_load / reset
//!   Loaded ---------------------> Empty
//!     ^                             |
//!     +------ commit (current) -----+
//! ```
//!
//! Every `begin_load` and `reset` bumps the generation. A build may only
//! commit with the ticket of the current generation, so a slow build that
//! was superseded by a newer upload (or a reset) is discarded.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::{DocumentInfo, KnowledgeBase};

/// Proof that a load was started at a given generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Externally visible state of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PipelineStatus {
    Empty,
    Loaded { document: DocumentInfo },
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    active: Option<Arc<KnowledgeBase>>,
}

/// Holds at most one active knowledge base.
///
/// The lock only guards pointer reads and swaps; callers do all slow work
/// (extraction, embedding, generation) without holding it.
#[derive(Debug, Default)]
pub struct PipelineState {
    slot: RwLock<Slot>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the active knowledge base and start a new load
    pub async fn begin_load(&self) -> LoadTicket {
        let mut slot = self.slot.write().await;
        slot.generation += 1;
        slot.active = None;

        LoadTicket {
            generation: slot.generation,
        }
    }

    /// Install a built knowledge base if no newer load or reset happened.
    ///
    /// Returns `false` when the ticket was superseded; the knowledge base is
    /// dropped in that case.
    pub async fn commit(&self, ticket: LoadTicket, knowledge_base: KnowledgeBase) -> bool {
        let mut slot = self.slot.write().await;

        if slot.generation != ticket.generation {
            return false;
        }

        slot.active = Some(Arc::new(knowledge_base));
        true
    }

    /// Drop the active knowledge base and invalidate in-flight loads
    pub async fn reset(&self) {
        let mut slot = self.slot.write().await;
        slot.generation += 1;
        slot.active = None;
    }

    /// Snapshot of the active knowledge base
    pub async fn current(&self) -> Option<Arc<KnowledgeBase>> {
        self.slot.read().await.active.clone()
    }

    pub async fn status(&self) -> PipelineStatus {
        match self.current().await {
            Some(kb) => PipelineStatus::Loaded {
                document: kb.info().clone(),
            },
            None => PipelineStatus::Empty,
        }
    }

    pub async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::{Chunk, ChunkMetadata, DocumentType};
    use crate::domain::knowledge_base::EmbeddingIndex;

    fn knowledge_base(name: &str) -> KnowledgeBase {
        let chunk = Chunk::new("text", ChunkMetadata::new(0, 1, 0, 4));
        let index = EmbeddingIndex::from_parts(vec![chunk], vec![vec![1.0]]).unwrap();
        KnowledgeBase::new(name, DocumentType::Txt, 4, index)
    }

    #[tokio::test]
    async fn test_initial_state_is_empty() {
        let state = PipelineState::new();

        assert!(state.current().await.is_none());
        assert_eq!(state.status().await, PipelineStatus::Empty);
    }

    #[tokio::test]
    async fn test_commit_loads() {
        let state = PipelineState::new();

        let ticket = state.begin_load().await;
        assert!(state.commit(ticket, knowledge_base("a.txt")).await);

        let current = state.current().await.unwrap();
        assert_eq!(current.document_name(), "a.txt");
        assert!(matches!(state.status().await, PipelineStatus::Loaded { .. }));
    }

    #[tokio::test]
    async fn test_begin_load_clears_previous() {
        let state = PipelineState::new();
        let ticket = state.begin_load().await;
        state.commit(ticket, knowledge_base("a.txt")).await;

        let _next = state.begin_load().await;

        assert!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn test_superseded_commit_is_rejected() {
        let state = PipelineState::new();

        let slow = state.begin_load().await;
        let fast = state.begin_load().await;

        assert!(state.commit(fast, knowledge_base("new.txt")).await);
        assert!(!state.commit(slow, knowledge_base("old.txt")).await);

        assert_eq!(state.current().await.unwrap().document_name(), "new.txt");
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight_load() {
        let state = PipelineState::new();

        let ticket = state.begin_load().await;
        state.reset().await;

        assert!(!state.commit(ticket, knowledge_base("a.txt")).await);
        assert!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_replacement() {
        let state = PipelineState::new();
        let ticket = state.begin_load().await;
        state.commit(ticket, knowledge_base("a.txt")).await;

        let snapshot = state.current().await.unwrap();
        state.reset().await;

        assert_eq!(snapshot.document_name(), "a.txt");
        assert!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn test_generation_is_monotonic() {
        let state = PipelineState::new();
        let first = state.begin_load().await;
        state.reset().await;
        let second = state.begin_load().await;

        assert!(second.generation() > first.generation());
        assert_eq!(state.generation().await, second.generation());
    }
}
