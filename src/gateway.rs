//! Vector index gateway: idempotent provisioning plus upsert/query
//!
//! The gateway owns the external index handle for the process lifetime.
//! Provisioning is lazy and single-flight: concurrent first callers
//! coalesce onto one attempt and share the resulting handle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::providers::index::{IndexSpec, VectorIndexService};
use crate::types::{IndexedEntry, RetrievedChunk};

/// Resolved handle for a ready index
#[derive(Debug, Clone)]
pub struct IndexHandle {
    pub name: String,
    pub host: String,
}

/// Gateway over the external similarity index
pub struct IndexGateway {
    service: Arc<dyn VectorIndexService>,
    config: IndexConfig,
    handle: OnceCell<IndexHandle>,
}

impl IndexGateway {
    /// Create a new gateway; no external call happens until first use
    pub fn new(service: Arc<dyn VectorIndexService>, config: IndexConfig) -> Self {
        Self {
            service,
            config,
            handle: OnceCell::new(),
        }
    }

    /// Get the index handle, provisioning the index on first use
    ///
    /// Idempotent: a second call returns the cached handle without issuing
    /// any control-plane request. Only one provisioning attempt is in
    /// flight at a time; concurrent callers await it and receive the same
    /// handle. A failed attempt is not cached, so a later call may retry.
    pub async fn ensure_index(&self) -> Result<&IndexHandle> {
        self.handle.get_or_try_init(|| self.provision()).await
    }

    async fn provision(&self) -> Result<IndexHandle> {
        let name = self.config.index_name.clone();

        let existing = self.service.list_indexes().await?;
        if existing.iter().any(|n| n == &name) {
            tracing::info!(index = %name, "index already exists");
        } else {
            tracing::info!(index = %name, dimension = self.config.dimension, "creating index");
            let spec = IndexSpec {
                name: name.clone(),
                dimension: self.config.dimension,
                metric: self.config.metric.clone(),
                cloud: self.config.cloud.clone(),
                region: self.config.region.clone(),
            };
            self.service.create_index(&spec).await?;
        }

        // Creation is asynchronous on the provider side; wait for readiness
        // within the configured bound rather than hanging forever.
        let deadline = Instant::now() + Duration::from_secs(self.config.provision_timeout_secs);
        loop {
            let status = self.service.describe_index(&name).await?;
            if status.ready {
                if let Some(host) = status.host {
                    tracing::info!(index = %name, host = %host, "index ready");
                    return Ok(IndexHandle { name, host });
                }
            }

            if Instant::now() >= deadline {
                return Err(Error::provisioning(format!(
                    "index '{}' not ready after {}s",
                    name, self.config.provision_timeout_secs
                )));
            }

            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    /// Insert or overwrite entries by id; completes all entries or fails
    pub async fn upsert(&self, entries: &[IndexedEntry]) -> Result<usize> {
        let handle = self.ensure_index().await?;

        let mut written = 0;
        for batch in entries.chunks(self.config.upsert_batch_size.max(1)) {
            written += self
                .service
                .upsert(&handle.host, &self.config.namespace, batch)
                .await?;
        }
        Ok(written)
    }

    /// Top-k similarity query, mapped to ranked chunks
    ///
    /// Ranks are assigned 0..n in result order; matches without stored
    /// metadata cannot be attributed and are dropped with a warning.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let handle = self.ensure_index().await?;

        let matches = self
            .service
            .query(&handle.host, &self.config.namespace, vector, top_k)
            .await?;

        Ok(matches
            .into_iter()
            .filter_map(|m| match m.metadata {
                Some(metadata) => Some((m.score, metadata)),
                None => {
                    tracing::warn!(id = %m.id, "match has no metadata, dropping");
                    None
                }
            })
            .enumerate()
            .map(|(rank, (score, metadata))| RetrievedChunk {
                text: metadata.text,
                metadata: metadata.info,
                relevance_rank: rank,
                score,
            })
            .collect())
    }
}
