//! Grounded prompt construction
//!
//! The template uses `${var:name}` placeholders. Values are substituted in a
//! single pass, so text inside the context that happens to look like a
//! placeholder is never expanded.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Exact response returned when the document does not contain the answer
pub const NO_ANSWER: &str = "I cannot find the answer to that question in the provided document.";

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{var:([a-z][a-z_]*)\}").unwrap());

static DETAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(details?|detailed|more information|comprehensive|full summary|elaborate|in[ -]depth|thorough(ly)?)\b",
    )
    .unwrap()
});

const GROUNDED_TEMPLATE: &str = "\
You are a helpful assistant that answers questions based SOLELY on the provided document context.

Answer guidelines:
1. Use only the information in the context below. Do not make up information or refer to external knowledge.
2. Analyze all relevant information in the context and synthesize a coherent, accurate answer.
3. ${var:style_instruction}
4. If the context does not contain sufficient information to answer the question, reply with exactly: \"${var:no_answer}\"

Context:
${var:context}

Question:
${var:question}

Answer:";

const CONCISE_INSTRUCTION: &str =
    "Give a concise answer of 3 to 5 sentences.";

const DETAILED_INSTRUCTION: &str = "The user asked for a detailed answer. Give a thorough and elaborate answer that uses all relevant information from the context.";

/// Length of the generated answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStyle {
    /// Default: 3 to 5 sentences
    Concise,
    /// Requested explicitly by the question
    Detailed,
}

impl AnswerStyle {
    /// Choose the style from the wording of the question
    pub fn detect(question: &str) -> Self {
        if DETAIL_PATTERN.is_match(question) {
            Self::Detailed
        } else {
            Self::Concise
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Concise => CONCISE_INSTRUCTION,
            Self::Detailed => DETAILED_INSTRUCTION,
        }
    }
}

/// Render the grounded instruction for one question
pub fn render_grounded_prompt(context: &str, question: &str, style: AnswerStyle) -> String {
    let mut values = HashMap::new();
    values.insert("context", context);
    values.insert("question", question);
    values.insert("style_instruction", style.instruction());
    values.insert("no_answer", NO_ANSWER);

    VARIABLE_PATTERN
        .replace_all(GROUNDED_TEMPLATE, |caps: &Captures<'_>| {
            values
                .get(&caps[1])
                .map(|v| v.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Map generator output onto the sentinel when it signals "not found"
pub fn normalize_answer(generated: &str) -> String {
    let trimmed = generated.trim();

    if trimmed.is_empty() || contains_sentinel(trimmed) {
        return NO_ANSWER.to_string();
    }

    trimmed.to_string()
}

fn contains_sentinel(text: &str) -> bool {
    text.to_lowercase().contains(&NO_ANSWER.to_lowercase())
}
