//! Embedding response types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Index of this embedding in the batch
    index: usize,
    /// The embedding vector
    embedding: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding
    pub fn new(index: usize, embedding: Vec<f32>) -> Self {
        Self { index, embedding }
    }

    /// Get the index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the embedding vector
    pub fn vector(&self) -> &[f32] {
        &self.embedding
    }

    /// Get the embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    /// Consume and return the vector
    pub fn into_vector(self) -> Vec<f32> {
        self.embedding
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Mismatched lengths, empty vectors and zero vectors all score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Usage statistics for embedding request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    /// Number of prompt tokens
    prompt_tokens: u32,
    /// Total tokens used
    total_tokens: u32,
}

impl EmbeddingUsage {
    /// Create new usage stats
    pub fn new(prompt_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens,
        }
    }

    /// Get prompt tokens
    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    /// Get total tokens
    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Response from an embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// Model used
    model: String,
    /// Generated embeddings
    data: Vec<Embedding>,
    /// Usage statistics
    usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    /// Create a new embedding response
    pub fn new(model: String, data: Vec<Embedding>, usage: EmbeddingUsage) -> Self {
        Self { model, data, usage }
    }

    /// Get the model used
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get all embeddings
    pub fn embeddings(&self) -> &[Embedding] {
        &self.data
    }

    /// Get the first embedding (for single input requests)
    pub fn first(&self) -> Option<&Embedding> {
        self.data.first()
    }

    /// Get usage statistics
    pub fn usage(&self) -> &EmbeddingUsage {
        &self.usage
    }

    /// Consume the response and return vectors ordered by batch index.
    ///
    /// Fails unless there is exactly one non-empty vector per input and all
    /// vectors share one dimension.
    pub fn into_ordered_vectors(self, expected: usize) -> Result<Vec<Vec<f32>>, DomainError> {
        if self.data.len() != expected {
            return Err(DomainError::internal(format!(
                "expected {} embeddings, provider returned {}",
                expected,
                self.data.len()
            )));
        }

        let mut data = self.data;
        data.sort_by_key(|e| e.index);

        let dimensions = data.first().map(|e| e.dimensions()).unwrap_or(0);

        for (position, embedding) in data.iter().enumerate() {
            if embedding.index != position {
                return Err(DomainError::internal(format!(
                    "embedding indices are not contiguous (missing index {})",
                    position
                )));
            }

            if embedding.dimensions() == 0 || embedding.dimensions() != dimensions {
                return Err(DomainError::internal(format!(
                    "embedding {} has {} dimensions, expected {}",
                    position,
                    embedding.dimensions(),
                    dimensions
                )));
            }
        }

        Ok(data.into_iter().map(Embedding::into_vector).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_creation() {
        let emb = Embedding::new(0, vec![0.1, 0.2, 0.3]);

        assert_eq!(emb.index(), 0);
        assert_eq!(emb.dimensions(), 3);
        assert_eq!(emb.vector(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];

        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];

        assert!(cosine_similarity(&a, &b).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];

        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        let empty: Vec<f32> = vec![];
        assert_eq!(cosine_similarity(&empty, &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_ordered_vectors_sorts_by_index() {
        let response = EmbeddingResponse::new(
            "m".into(),
            vec![Embedding::new(1, vec![0.0, 1.0]), Embedding::new(0, vec![1.0, 0.0])],
            EmbeddingUsage::default(),
        );

        let vectors = response.into_ordered_vectors(2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_ordered_vectors_rejects_wrong_count() {
        let response = EmbeddingResponse::new(
            "m".into(),
            vec![Embedding::new(0, vec![1.0])],
            EmbeddingUsage::default(),
        );

        assert!(response.into_ordered_vectors(2).is_err());
    }

    #[test]
    fn test_ordered_vectors_rejects_mixed_dimensions() {
        let response = EmbeddingResponse::new(
            "m".into(),
            vec![Embedding::new(0, vec![1.0, 0.0]), Embedding::new(1, vec![1.0])],
            EmbeddingUsage::default(),
        );

        assert!(response.into_ordered_vectors(2).is_err());
    }
}
