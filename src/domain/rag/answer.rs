use serde::{Deserialize, Serialize};

use super::prompt::NO_ANSWER;

/// Result of answering one question against the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// Texts of the chunks used as context, in retrieval order
    pub sources: Vec<String>,
}

impl Answer {
    pub fn new(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            sources,
        }
    }

    /// The sentinel answer with no supporting context
    pub fn not_found() -> Self {
        Self::new(NO_ANSWER, Vec::new())
    }

    pub fn is_not_found(&self) -> bool {
        self.answer == NO_ANSWER
    }
}
