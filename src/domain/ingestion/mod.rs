//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `DocumentType` for the supported upload formats
//! - `DocumentParser` trait for extracting text from a document
//! - `ChunkingStrategy` trait for splitting text into chunks

pub mod chunker;
pub mod document_type;
pub mod parser;

pub use chunker::{helpers, Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use document_type::DocumentType;
pub use parser::{DocumentMetadata, DocumentParser, ParsedDocument, ParserInput};
