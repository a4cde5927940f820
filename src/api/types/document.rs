//! Request and response bodies for the document QA endpoints

use serde::{Deserialize, Serialize};

use crate::domain::knowledge_base::DocumentInfo;

/// Body of `POST /chat/`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// Body returned by a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub document: DocumentInfo,
}

impl UploadResponse {
    pub fn new(document: DocumentInfo) -> Self {
        Self {
            message: format!(
                "Document '{}' processed successfully. You can now ask questions about it.",
                document.name
            ),
            document,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
