//! Application state for the chat server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::chain::ConversationalChain;
use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::IndexGateway;
use crate::ingestion::IngestPipeline;
use crate::providers::{EmbeddingProvider, LlmProvider, OpenAiClient, PineconeClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    chain: ConversationalChain,
    pipeline: IngestPipeline,
    ready: RwLock<bool>,
}

impl AppState {
    /// Wire up providers, the index gateway, the chain, and the ingestion
    /// pipeline. No external call happens here; the index is provisioned
    /// lazily on first use.
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("initializing application state");

        let openai = Arc::new(OpenAiClient::new(&config.llm, &config.embeddings));
        let embedder: Arc<dyn EmbeddingProvider> = openai.clone();
        let llm: Arc<dyn LlmProvider> = openai;
        tracing::info!(
            embed_model = %config.embeddings.model,
            chat_model = %config.llm.chat_model,
            "LLM providers initialized"
        );

        let index_service = Arc::new(PineconeClient::new(&config.index));
        let gateway = Arc::new(IndexGateway::new(index_service, config.index.clone()));
        tracing::info!(index = %config.index.index_name, "index gateway initialized");

        let chain = ConversationalChain::new(
            &config,
            Arc::clone(&embedder),
            Arc::clone(&llm),
            Arc::clone(&gateway),
        );
        let pipeline = IngestPipeline::new(&config, embedder, gateway);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                chain,
                pipeline,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the conversational chain
    pub fn chain(&self) -> &ConversationalChain {
        &self.inner.chain
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
