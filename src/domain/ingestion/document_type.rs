//! Supported document types and detection from filenames

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Declared type of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Txt,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [Self::Pdf, Self::Docx, Self::Txt];

    /// File extension associated with this type, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    /// MIME type associated with this type
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain",
        }
    }

    /// Resolve a type from a bare extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Result<Self, DomainError> {
        let ext = extension.trim_start_matches('.').to_lowercase();

        Self::ALL
            .into_iter()
            .find(|t| t.extension() == ext)
            .ok_or_else(|| {
                DomainError::extraction(format!(
                    "Unsupported file type: .{}. Only .pdf, .docx, and .txt are supported.",
                    ext
                ))
            })
    }

    /// Resolve a type from the last extension of a filename
    pub fn from_filename(filename: &str) -> Result<Self, DomainError> {
        // A name without a dot is its own "extension" and will be rejected
        let ext = filename.rsplit('.').next().unwrap_or_default();
        Self::from_extension(ext)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
    }
}
