//! PDF document parser

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, DocumentType, ParsedDocument, ParserInput,
};
use crate::domain::DomainError;

/// Parser for PDF files backed by `pdf-extract`.
///
/// Page texts are concatenated in page order without a separator.
#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::extraction("PDF file is empty"));
        }

        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| DomainError::extraction(format!("Failed to read PDF: {}", e)))
    }
}

#[async_trait]
impl DocumentParser for PdfParser {
    fn document_type(&self) -> DocumentType {
        DocumentType::Pdf
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let bytes = input.content;

        // the PDF library can panic on malformed input; a panic surfaces as a JoinError
        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&bytes))
            .await
            .map_err(|e| DomainError::extraction(format!("PDF extraction aborted: {}", e)))??;

        debug!(pages = pages.len(), "Extracted PDF text");

        let mut metadata = DocumentMetadata::new()
            .with_mime_type(DocumentType::Pdf.mime_type())
            .with_page_count(pages.len());

        if let Some(filename) = input.filename {
            metadata = metadata.with_source(filename);
        }

        Ok(ParsedDocument::new(pages.concat(), metadata))
    }
}
