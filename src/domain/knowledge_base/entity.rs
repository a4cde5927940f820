use chrono::{DateTime, Utc};
use serde::Serialize;

use super::EmbeddingIndex;
use crate::domain::ingestion::DocumentType;

/// Identity of the document a knowledge base was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub document_type: DocumentType,
    pub chunk_count: usize,
    /// Characters of extracted text
    pub text_length: usize,
    pub loaded_at: DateTime<Utc>,
}

/// The active index plus the identity of its source document
#[derive(Debug)]
pub struct KnowledgeBase {
    info: DocumentInfo,
    index: EmbeddingIndex,
}

impl KnowledgeBase {
    pub fn new(
        name: impl Into<String>,
        document_type: DocumentType,
        text_length: usize,
        index: EmbeddingIndex,
    ) -> Self {
        Self {
            info: DocumentInfo {
                name: name.into(),
                document_type,
                chunk_count: index.len(),
                text_length,
                loaded_at: Utc::now(),
            },
            index,
        }
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn document_name(&self) -> &str {
        &self.info.name
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }
}
