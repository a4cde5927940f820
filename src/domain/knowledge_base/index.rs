//! Similarity-searchable index over the chunks of one document

use tracing::debug;

use crate::domain::embedding::{cosine_similarity, EmbeddingProvider, EmbeddingRequest, EmbeddingTask};
use crate::domain::ingestion::Chunk;
use crate::domain::DomainError;

/// Number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 5;

/// Number of chunks sent to the embedding provider per request
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Chunks of a single document paired 1:1 with their embedding vectors.
///
/// A value only exists when every chunk has a vector of the same dimension.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
}

impl EmbeddingIndex {
    /// Embed every chunk and build the index.
    ///
    /// Any provider failure aborts the whole build.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        model: &str,
        chunks: Vec<Chunk>,
        batch_size: usize,
    ) -> Result<Self, DomainError> {
        if chunks.is_empty() {
            return Err(DomainError::index_build(
                "Cannot build an index from an empty chunk sequence",
            ));
        }

        let batch_size = batch_size.max(1);
        let mut vectors = Vec::with_capacity(chunks.len());

        for (batch_number, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let request =
                EmbeddingRequest::batch(model, texts).with_task(EmbeddingTask::RetrievalDocument);

            let response = provider.embed(request).await.map_err(|e| {
                DomainError::index_build(format!(
                    "Embedding failed for batch {} ({} chunks): {}",
                    batch_number,
                    batch.len(),
                    e
                ))
            })?;

            debug!(
                provider = provider.provider_name(),
                batch = batch_number,
                chunks = batch.len(),
                tokens = response.usage().total_tokens(),
                "Embedded chunk batch"
            );

            let batch_vectors = response
                .into_ordered_vectors(batch.len())
                .map_err(|e| DomainError::index_build(format!("Malformed embedding response: {}", e)))?;

            vectors.extend(batch_vectors);
        }

        Self::from_parts(chunks, vectors)
    }

    /// Pair chunks with precomputed vectors
    pub fn from_parts(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self, DomainError> {
        if chunks.is_empty() {
            return Err(DomainError::index_build(
                "Cannot build an index from an empty chunk sequence",
            ));
        }

        if chunks.len() != vectors.len() {
            return Err(DomainError::index_build(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimensions = vectors[0].len();

        if dimensions == 0 || vectors.iter().any(|v| v.len() != dimensions) {
            return Err(DomainError::index_build(
                "Embedding vectors must be non-empty and share one dimension",
            ));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedChunk { chunk, vector })
            .collect();

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Top-`k` chunks by cosine similarity, best first.
    ///
    /// Ties keep document order and `k` is clamped to the number of chunks.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<ScoredChunk<'_>> {
        let mut scored: Vec<ScoredChunk<'_>> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: &entry.chunk,
                score: cosine_similarity(vector, &entry.vector),
            })
            .collect();

        // stable sort: equal scores stay in chunk order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k.min(self.entries.len()));
        scored
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimension shared by all vectors
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Indexed chunks in document order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::ingestion::ChunkMetadata;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk::new(text, ChunkMetadata::new(index, 0, 0, text.len()))
    }

    fn index_of(vectors: Vec<Vec<f32>>) -> EmbeddingIndex {
        let chunks = (0..vectors.len())
            .map(|i| chunk(i, &format!("chunk {}", i)))
            .collect();
        EmbeddingIndex::from_parts(chunks, vectors).unwrap()
    }

    #[test]
    fn test_query_ranks_by_similarity() {
        let index = index_of(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]]);

        let results = index.query(&[1.0, 0.0], 3);

        let order: Vec<usize> = results.iter().map(|r| r.chunk.index()).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_query_ties_keep_chunk_order() {
        let index = index_of(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 0.0]]);

        let results = index.query(&[1.0, 0.0], 4);

        let order: Vec<usize> = results.iter().map(|r| r.chunk.index()).collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_query_clamps_k() {
        let index = index_of(vec![vec![1.0], vec![2.0]]);

        assert_eq!(index.query(&[1.0], DEFAULT_TOP_K).len(), 2);
        assert!(index.query(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_query_with_wrong_dimension_scores_zero() {
        let index = index_of(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

        let results = index.query(&[1.0, 0.0, 0.0], 2);

        assert!(results.iter().all(|r| r.score == 0.0));
        assert_eq!(results[0].chunk.index(), 0);
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        assert!(EmbeddingIndex::from_parts(vec![], vec![]).is_err());
        assert!(EmbeddingIndex::from_parts(vec![chunk(0, "a")], vec![]).is_err());
        assert!(EmbeddingIndex::from_parts(
            vec![chunk(0, "a"), chunk(1, "b")],
            vec![vec![1.0], vec![1.0, 2.0]]
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_build_batches_all_chunks() {
        let provider = MockEmbeddingProvider::new("mock");
        let chunks: Vec<Chunk> = (0..7).map(|i| chunk(i, &format!("word{} text", i))).collect();

        let index = EmbeddingIndex::build(&provider, "mock-embedding", chunks, 3)
            .await
            .unwrap();

        assert_eq!(index.len(), 7);
        assert_eq!(index.dimensions(), 512);
        assert_eq!(provider.calls(), 3);
        assert_eq!(index.chunks().map(|c| c.index()).collect::<Vec<_>>(), (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_build_empty_fails() {
        let provider = MockEmbeddingProvider::new("mock");

        let err = EmbeddingIndex::build(&provider, "mock-embedding", vec![], 10)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::IndexBuild { .. }));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_build_fails_when_a_later_batch_fails() {
        let provider = MockEmbeddingProvider::new("mock").failing_after(2, "quota exceeded");
        let chunks: Vec<Chunk> = (0..10).map(|i| chunk(i, "some text")).collect();

        let err = EmbeddingIndex::build(&provider, "mock-embedding", chunks, 3)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::IndexBuild { .. }));
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(provider.calls(), 3);
    }
}
