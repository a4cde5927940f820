//! Plain text document parser

use async_trait::async_trait;

use crate::domain::ingestion::{
    DocumentMetadata, DocumentParser, DocumentType, ParsedDocument, ParserInput,
};
use crate::domain::DomainError;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parser for UTF-8 plain text files
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    /// Create a new plain text parser
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn document_type(&self) -> DocumentType {
        DocumentType::Txt
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let filename = input.filename.clone();
        let mut content = input.into_text()?;

        if content.starts_with(BYTE_ORDER_MARK) {
            content.drain(..BYTE_ORDER_MARK.len_utf8());
        }

        let mut metadata = DocumentMetadata::new().with_mime_type(DocumentType::Txt.mime_type());

        if let Some(filename) = filename {
            metadata = metadata.with_source(filename);
        }

        Ok(ParsedDocument::new(content, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_text_content() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_bytes(b"Paris is the capital of France.".to_vec());

        let result = parser.parse(input).await.unwrap();

        assert_eq!(result.content, "Paris is the capital of France.");
        assert_eq!(result.metadata.mime_type, Some("text/plain".to_string()));
    }

    #[tokio::test]
    async fn test_parse_bytes_content() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_bytes("Grüße aus Köln".as_bytes().to_vec());

        let result = parser.parse(input).await.unwrap();

        assert_eq!(result.content, "Grüße aus Köln");
    }

    #[tokio::test]
    async fn test_parse_strips_byte_order_mark() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_bytes(b"\xEF\xBB\xBFhello".to_vec());

        let result = parser.parse(input).await.unwrap();

        assert_eq!(result.content, "hello");
    }

    #[tokio::test]
    async fn test_parse_with_filename() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_bytes(b"content".to_vec()).with_filename("notes.txt");

        let result = parser.parse(input).await.unwrap();

        assert_eq!(result.metadata.source, Some("notes.txt".to_string()));
    }

    #[tokio::test]
    async fn test_parse_invalid_utf8() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_bytes(vec![0xff, 0xfe, 0x00]);

        let err = parser.parse(input).await.unwrap_err();

        assert!(matches!(err, DomainError::Extraction { .. }));
    }

    #[tokio::test]
    async fn test_whitespace_only_is_blank_not_error() {
        let parser = PlainTextParser::new();

        let result = parser.parse(ParserInput::from_bytes(b" \n\t ".to_vec())).await.unwrap();

        assert!(result.is_blank());
    }
}
