//! Top-k retrieval for a standalone question

use std::sync::Arc;

use crate::error::Result;
use crate::gateway::IndexGateway;
use crate::providers::EmbeddingProvider;
use crate::types::RetrievedChunk;

/// Embeds a standalone question and queries the index gateway
///
/// No caching: every query re-embeds and re-queries. Dependency errors
/// propagate unchanged.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    gateway: Arc<IndexGateway>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, gateway: Arc<IndexGateway>, top_k: usize) -> Self {
        Self {
            embedder,
            gateway,
            top_k,
        }
    }

    /// Return the top-k most similar chunks for the question
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embedder.embed(question).await?;
        let chunks = self.gateway.query(&vector, self.top_k).await?;
        tracing::debug!(retrieved = chunks.len(), top_k = self.top_k, "retrieval complete");
        Ok(chunks)
    }
}
