//! Ingestion pipeline: load, chunk, embed, and upsert the corpus

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::IndexGateway;
use crate::ingestion::{DocumentLoader, TextChunker};
use crate::providers::EmbeddingProvider;
use crate::types::{ChunkDocument, ChunkMetadata, IndexedEntry, PageLocation};

/// Outcome of one ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub entries_written: usize,
    pub pages: Option<u32>,
    pub elapsed_ms: u64,
    pub ingested_at: DateTime<Utc>,
}

/// Composes the loader, chunker, embedding client, and index gateway into
/// the one-time ingestion path
///
/// Runs out-of-band from query serving. A failure at any stage aborts the
/// run with that stage's typed error; entries already written stay in the
/// index, and re-ingestion overwrites them through the deterministic ids.
pub struct IngestPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    gateway: Arc<IndexGateway>,
    namespace: String,
}

impl IngestPipeline {
    /// Create a new pipeline
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        gateway: Arc<IndexGateway>,
    ) -> Self {
        Self {
            chunker: TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap),
            embedder,
            gateway,
            namespace: config.index.namespace.clone(),
        }
    }

    /// Ingest the source document, returning the number of entries written
    pub async fn ingest(&self, path: &Path) -> Result<IngestReport> {
        let start = Instant::now();
        tracing::info!(path = %path.display(), "ingesting source document");

        let doc = DocumentLoader::load(path)?;

        let mut chunks = Vec::new();
        for page in &doc.pages {
            for text in self.chunker.chunk(&page.text) {
                chunks.push(ChunkDocument {
                    text,
                    metadata: ChunkMetadata {
                        source: Some(doc.source.clone()),
                        file_name: Some(doc.source.clone()),
                        page: page.number,
                        loc: page.number.map(|n| PageLocation {
                            page_number: Some(n),
                        }),
                        namespace: Some(self.namespace.clone()),
                    },
                });
            }
        }
        tracing::info!(chunks = chunks.len(), "document chunked");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let source_key = source_key(&doc.source);
        let entries: Vec<IndexedEntry> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (chunk, values))| chunk.into_entry(format!("{source_key}-{i}"), values))
            .collect();

        let entries_written = self.gateway.upsert(&entries).await?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(entries_written, elapsed_ms, "ingestion complete");

        Ok(IngestReport {
            source: doc.source,
            entries_written,
            pages: doc.page_count,
            elapsed_ms,
            ingested_at: Utc::now(),
        })
    }
}

/// Stable prefix for entry ids, derived from the source name so that
/// re-ingesting the same document overwrites its previous entries
fn source_key(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    hex::encode(digest)[..12].to_string()
}
