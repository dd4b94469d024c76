//! Prompt templates for condensation and grounded answering

use crate::types::RetrievedChunk;

/// Prompt builder for the conversational chain
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking the model to rephrase a follow-up question so it can
    /// stand alone as a retrieval query
    pub fn build_condense_prompt(chat_history: &str, question: &str) -> String {
        format!(
            r#"Given the following conversation and a follow-up question, rephrase the follow-up so it can be understood by itself.
Chat history:
{chat_history}
Follow-up question: {question}
Standalone question:"#
        )
    }

    /// Concatenate retrieved chunk text into the generation context
    pub fn build_context(chunks: &[RetrievedChunk]) -> String {
        chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Grounded QA prompt: answer only from the context, admit not knowing
    /// otherwise. This is prompt-level policy, not a runtime constraint.
    pub fn build_qa_prompt(context: &str, question: &str) -> String {
        format!(
            r#"You are a helpful assistant. Use the following context to answer the user's question.
If you don't know the answer, say you don't know.
Context:
{context}

Question: {question}
Helpful answer:"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    #[test]
    fn condense_prompt_embeds_history_and_question() {
        let prompt = PromptBuilder::build_condense_prompt(
            "Human: What's the warranty?\nAssistant: 12 months.",
            "And for parts?",
        );
        assert!(prompt.contains("Human: What's the warranty?"));
        assert!(prompt.contains("Follow-up question: And for parts?"));
        assert!(prompt.ends_with("Standalone question:"));
    }

    #[test]
    fn context_joins_chunks_in_order() {
        let chunks: Vec<_> = ["first", "second"]
            .iter()
            .enumerate()
            .map(|(i, text)| RetrievedChunk {
                text: text.to_string(),
                metadata: ChunkMetadata::default(),
                relevance_rank: i,
                score: 1.0,
            })
            .collect();
        assert_eq!(PromptBuilder::build_context(&chunks), "first\n\nsecond");
    }

    #[test]
    fn qa_prompt_handles_empty_context() {
        let prompt = PromptBuilder::build_qa_prompt("", "What is the refund policy?");
        assert!(prompt.contains("Question: What is the refund policy?"));
        assert!(prompt.contains("say you don't know"));
    }
}
