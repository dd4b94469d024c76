//! Standalone-question condensation

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::types::ChatHistory;

use super::prompt::PromptBuilder;

/// Rephrases a follow-up question into a history-independent retrieval query
pub struct QuestionCondenser {
    llm: Arc<dyn LlmProvider>,
    /// Degrade to the raw question when condensation fails, instead of
    /// aborting the chain. An explicit policy, logged when taken.
    fallback_to_question: bool,
}

impl QuestionCondenser {
    /// Create a new condenser
    pub fn new(llm: Arc<dyn LlmProvider>, fallback_to_question: bool) -> Self {
        Self {
            llm,
            fallback_to_question,
        }
    }

    /// Produce a standalone question
    ///
    /// With no history there is nothing to resolve: the trimmed,
    /// whitespace-collapsed question is returned without an LLM call.
    pub async fn condense(&self, history: &ChatHistory, question: &str) -> Result<String> {
        let sanitized = sanitize(question);

        if history.is_empty() {
            return Ok(sanitized);
        }

        let prompt = PromptBuilder::build_condense_prompt(&history.to_transcript(), &sanitized);
        let outcome = match self.llm.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => return Ok(text.trim().to_string()),
            Ok(_) => Error::condensation("model returned empty rephrasing"),
            Err(e) => Error::condensation(e.to_string()),
        };

        if self.fallback_to_question {
            tracing::warn!("condensation failed ({outcome}), falling back to the raw question");
            Ok(sanitized)
        } else {
            Err(outcome)
        }
    }
}

/// Trim and collapse internal whitespace runs to single spaces
fn sanitize(question: &str) -> String {
    question.split_whitespace().collect::<Vec<_>>().join(" ")
}
