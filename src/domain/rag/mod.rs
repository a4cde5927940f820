//! Question answering grounded in the active knowledge base

mod answer;
mod answerer;
mod prompt;

pub use answer::Answer;
pub use answerer::{AnswererConfig, RetrievalAugmentedAnswerer};
pub use prompt::{normalize_answer, render_grounded_prompt, AnswerStyle, NO_ANSWER};
