//! Document parser implementations

mod docx;
mod pdf;
mod plain_text;

pub use docx::DocxParser;
pub use pdf::PdfParser;
pub use plain_text::PlainTextParser;
