//! The conversational chain state machine
//!
//! One request flows `Idle → Condensing → Retrieving → Generating →
//! {Completed | Failed}`. Condensing and Retrieving run before any token
//! reaches the consumer, so their failures surface as a clean `Err`;
//! Generating streams through a bounded channel and terminates the stream
//! with exactly one `Completed` or `Failed` event.

use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gateway::IndexGateway;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::types::{ChatHistory, SourceRef};

use super::condense::QuestionCondenser;
use super::prompt::PromptBuilder;
use super::retrieve::Retriever;

/// Chain lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    Condensing,
    Retrieving,
    Generating,
    Completed,
    Failed,
}

impl ChainState {
    /// Advance to `next`, rejecting transitions the lifecycle does not
    /// allow. Terminal states cannot be left; any live state may fail.
    pub fn advance(&mut self, next: ChainState) -> Result<()> {
        use ChainState::*;
        let legal = match (*self, next) {
            (Idle, Condensing)
            | (Condensing, Retrieving)
            | (Retrieving, Generating)
            | (Generating, Completed) => true,
            (Completed, _) | (Failed, _) => false,
            (_, Failed) => true,
            _ => false,
        };

        if legal {
            *self = next;
            Ok(())
        } else {
            Err(Error::pipeline(format!(
                "illegal chain transition {self:?} -> {next:?}"
            )))
        }
    }
}

/// One event of an answer stream
#[derive(Debug)]
pub enum AnswerEvent {
    /// A generated text fragment, in production order
    Token(String),
    /// Terminal: generation finished; carries the full answer (already
    /// delivered incrementally) and the source references
    Completed {
        answer: String,
        sources: Vec<SourceRef>,
    },
    /// Terminal: generation failed after the stream opened
    Failed(Error),
}

/// The produced answer: a finite, non-restartable event sequence
///
/// Backed by a bounded channel; the producer suspends when the consumer
/// lags, and dropping the stream cancels the producer.
#[derive(Debug)]
pub struct AnswerStream {
    rx: mpsc::Receiver<AnswerEvent>,
}

impl Stream for AnswerStream {
    type Item = AnswerEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Orchestrates condensation, retrieval, and streamed generation for one
/// request
pub struct ConversationalChain {
    condenser: QuestionCondenser,
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    max_sources: usize,
    stream_buffer: usize,
}

impl ConversationalChain {
    /// Wire up the chain from configuration and providers
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        gateway: Arc<IndexGateway>,
    ) -> Self {
        Self {
            condenser: QuestionCondenser::new(Arc::clone(&llm), config.chain.condense_fallback),
            retriever: Retriever::new(embedder, gateway, config.chain.top_k),
            llm,
            max_sources: config.chain.max_sources,
            stream_buffer: config.chain.stream_buffer.max(1),
        }
    }

    /// Run the chain for one validated request
    ///
    /// Errors during condensation or retrieval return `Err` before any
    /// token exists. The `Ok` stream yields tokens followed by exactly one
    /// terminal event.
    pub async fn run(&self, question: &str, history: &ChatHistory) -> Result<AnswerStream> {
        let mut state = ChainState::Idle;

        state.advance(ChainState::Condensing)?;
        let standalone = match self.condenser.condense(history, question).await {
            Ok(q) => q,
            Err(e) => {
                state.advance(ChainState::Failed).ok();
                return Err(e);
            }
        };
        tracing::debug!(question = %standalone, "condensed standalone question");

        state.advance(ChainState::Retrieving)?;
        let chunks = match self.retriever.retrieve(&standalone).await {
            Ok(chunks) => chunks,
            Err(e) => {
                state.advance(ChainState::Failed).ok();
                return Err(e);
            }
        };

        // An empty result set is valid: generation still runs and the
        // prompt policy produces a "don't know" answer.
        state.advance(ChainState::Generating)?;
        let context = PromptBuilder::build_context(&chunks);
        let prompt = PromptBuilder::build_qa_prompt(&context, &standalone);
        let mut tokens = match self.llm.complete_stream(&prompt).await {
            Ok(stream) => stream,
            Err(e) => {
                state.advance(ChainState::Failed).ok();
                return Err(e);
            }
        };

        let sources = SourceRef::from_chunks(&chunks, self.max_sources);
        let (tx, rx) = mpsc::channel(self.stream_buffer);

        tokio::spawn(async move {
            let mut answer = String::new();
            while let Some(item) = tokens.next().await {
                match item {
                    Ok(token) => {
                        answer.push_str(&token);
                        if tx.send(AnswerEvent::Token(token)).await.is_err() {
                            // Consumer disconnected; dropping the token
                            // stream abandons the in-flight generation.
                            tracing::debug!("answer consumer disconnected, cancelling generation");
                            return;
                        }
                    }
                    Err(e) => {
                        state.advance(ChainState::Failed).ok();
                        let _ = tx.send(AnswerEvent::Failed(e)).await;
                        return;
                    }
                }
            }

            state.advance(ChainState::Completed).ok();
            let _ = tx.send(AnswerEvent::Completed { answer, sources }).await;
        });

        Ok(AnswerStream { rx })
    }
}
