//! Document parser trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::DocumentType;
use crate::domain::DomainError;

/// Input for document parsing
#[derive(Debug, Clone)]
pub struct ParserInput {
    /// Raw document bytes
    pub content: Vec<u8>,
    /// Optional filename, recorded as the document source
    pub filename: Option<String>,
}

impl ParserInput {
    /// Create input from binary content
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            filename: None,
        }
    }

    /// Set the filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Decode the content as strict UTF-8
    pub fn into_text(self) -> Result<String, DomainError> {
        String::from_utf8(self.content)
            .map_err(|e| DomainError::extraction(format!("Invalid UTF-8: {}", e)))
    }
}

/// Metadata extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// MIME type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Number of pages (pdf)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// Number of paragraphs (docx)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_count: Option<usize>,
}

impl DocumentMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_page_count(mut self, pages: usize) -> Self {
        self.page_count = Some(pages);
        self
    }

    pub fn with_paragraph_count(mut self, paragraphs: usize) -> Self {
        self.paragraph_count = Some(paragraphs);
        self
    }
}

/// Result of parsing a document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Extracted text content
    pub content: String,
    /// Extracted metadata
    pub metadata: DocumentMetadata,
}

impl ParsedDocument {
    /// Create a parsed document
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// True when no non-whitespace text was extracted
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Trait for document parsers (text extractors)
///
/// Parsers never fail because the extracted text is empty; callers decide
/// what an empty document means.
#[async_trait]
pub trait DocumentParser: Send + Sync + Debug {
    /// The document type this parser handles
    fn document_type(&self) -> DocumentType;

    /// Parse a document and extract text content and metadata
    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_input_into_text() {
        let input = ParserInput::from_bytes(b"hello world".to_vec());
        assert_eq!(input.into_text().unwrap(), "hello world");
    }

    #[test]
    fn test_parser_input_invalid_utf8() {
        let err = ParserInput::from_bytes(vec![0xff, 0xfe]).into_text().unwrap_err();
        assert!(matches!(err, DomainError::Extraction { .. }));
    }

    #[test]
    fn test_parser_input_builder() {
        let input = ParserInput::from_bytes(Vec::new()).with_filename("test.txt");

        assert_eq!(input.filename, Some("test.txt".to_string()));
        assert!(input.content.is_empty());
    }

    #[test]
    fn test_parsed_document_blank() {
        assert!(ParsedDocument::new(" \n\t", DocumentMetadata::new()).is_blank());
        assert!(!ParsedDocument::new("x", DocumentMetadata::new()).is_blank());
    }
}
