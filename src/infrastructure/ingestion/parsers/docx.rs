//! DOCX document parser
//!
//! Reads `word/document.xml` from the zip container and walks it with
//! `quick-xml`. Each paragraph (including paragraphs inside tables) is
//! emitted in document order and terminated by `\n`.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, DocumentType, ParsedDocument, ParserInput,
};
use crate::domain::DomainError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Parser for Office Open XML word processing documents
#[derive(Debug, Clone, Default)]
pub struct DocxParser;

/// Paragraph text extracted from the document part
#[derive(Debug, Default, PartialEq)]
struct DocxText {
    text: String,
    paragraphs: usize,
}

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    fn read_document_part(bytes: &[u8]) -> Result<String, DomainError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DomainError::extraction(format!("Not a valid DOCX file: {}", e)))?;

        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
            DomainError::extraction(format!("DOCX is missing {}: {}", DOCUMENT_PART, e))
        })?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| DomainError::extraction(format!("Failed to read {}: {}", DOCUMENT_PART, e)))?;

        Ok(xml)
    }

    fn extract_paragraphs(xml: &str) -> Result<DocxText, DomainError> {
        let mut reader = Reader::from_str(xml);
        let mut out = DocxText::default();
        let mut in_text_run = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                DomainError::extraction(format!(
                    "Malformed DOCX XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
                Event::End(e) => match e.name().as_ref() {
                    b"w:t" => in_text_run = false,
                    b"w:p" => {
                        out.text.push('\n');
                        out.paragraphs += 1;
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:tab" => out.text.push('\t'),
                    b"w:br" | b"w:cr" => out.text.push('\n'),
                    b"w:p" => {
                        out.text.push('\n');
                        out.paragraphs += 1;
                    }
                    _ => {}
                },
                Event::Text(t) if in_text_run => {
                    let text = t.unescape().map_err(|e| {
                        DomainError::extraction(format!("Invalid text in DOCX: {}", e))
                    })?;
                    out.text.push_str(&text);
                }
                Event::CData(t) if in_text_run => {
                    out.text.push_str(&String::from_utf8_lossy(&t));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(out)
    }

    fn extract(bytes: &[u8]) -> Result<DocxText, DomainError> {
        let xml = Self::read_document_part(bytes)?;
        Self::extract_paragraphs(&xml)
    }
}

#[async_trait]
impl DocumentParser for DocxParser {
    fn document_type(&self) -> DocumentType {
        DocumentType::Docx
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let bytes = input.content;

        let extracted = tokio::task::spawn_blocking(move || Self::extract(&bytes))
            .await
            .map_err(|e| DomainError::extraction(format!("DOCX extraction aborted: {}", e)))??;

        debug!(paragraphs = extracted.paragraphs, "Extracted DOCX text");

        let mut metadata = DocumentMetadata::new()
            .with_mime_type(DocumentType::Docx.mime_type())
            .with_paragraph_count(extracted.paragraphs);

        if let Some(filename) = input.filename {
            metadata = metadata.with_source(filename);
        }

        Ok(ParsedDocument::new(extracted.text, metadata))
    }
}
