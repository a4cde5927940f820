//! Document ingestion infrastructure
//!
//! Text extraction for each supported document type and chunking of the
//! extracted text.

pub mod chunkers;
pub mod factory;
pub mod parsers;

pub use chunkers::RecursiveChunker;
pub use factory::{ChunkerFactory, ParserFactory};
pub use parsers::{DocxParser, PdfParser, PlainTextParser};
