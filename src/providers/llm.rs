//! LLM provider trait

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

use crate::error::Result;

/// A lazy, finite, non-restartable sequence of generated text fragments
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for LLM completion in both streaming and non-streaming modes
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a completion and return the full text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Run a completion and stream text fragments as they are produced
    ///
    /// The returned stream ends after the final fragment; a transport or
    /// service failure mid-generation surfaces as an `Err` item.
    async fn complete_stream(&self, prompt: &str) -> Result<TokenStream>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model used for generation
    fn model(&self) -> &str;
}
