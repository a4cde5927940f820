//! Factory for creating parsers and chunkers

use std::sync::Arc;

use crate::domain::ingestion::{ChunkingStrategy, DocumentParser, DocumentType};

use super::chunkers::RecursiveChunker;
use super::parsers::{DocxParser, PdfParser, PlainTextParser};

/// Factory for creating document parsers
#[derive(Debug, Default)]
pub struct ParserFactory;

impl ParserFactory {
    /// Create the parser for the given document type
    pub fn create(document_type: DocumentType) -> Arc<dyn DocumentParser> {
        match document_type {
            DocumentType::Pdf => Arc::new(PdfParser::new()),
            DocumentType::Docx => Arc::new(DocxParser::new()),
            DocumentType::Txt => Arc::new(PlainTextParser::new()),
        }
    }

    /// Get a list of all supported file extensions
    pub fn supported_extensions() -> Vec<&'static str> {
        DocumentType::ALL.iter().map(|t| t.extension()).collect()
    }
}

/// Factory for creating chunking strategies
#[derive(Debug, Default)]
pub struct ChunkerFactory;

impl ChunkerFactory {
    /// The chunker used for uploaded documents
    pub fn create() -> Arc<dyn ChunkingStrategy> {
        Arc::new(RecursiveChunker::new())
    }
}
