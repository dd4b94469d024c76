//! Vector index service trait and wire types

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::types::{EntryMetadata, IndexedEntry};

/// Parameters for creating a serverless index
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

/// Provisioning status of an index
#[derive(Debug, Clone, Default)]
pub struct IndexStatus {
    /// The provider reports the index as ready to serve
    pub ready: bool,
    /// Data-plane host, available once provisioning has progressed
    pub host: Option<String>,
}

/// One similarity match as returned by the index service
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<EntryMetadata>,
}

/// Trait over the external similarity index service
///
/// Index creation is asynchronous on the provider side; callers poll
/// `describe_index` until `ready`. Data-plane operations take the host
/// resolved during provisioning.
#[async_trait]
pub trait VectorIndexService: Send + Sync {
    /// Names of all existing indexes
    async fn list_indexes(&self) -> Result<Vec<String>>;

    /// Create an index; creating an index that already exists is not an error
    async fn create_index(&self, spec: &IndexSpec) -> Result<()>;

    /// Describe an index's readiness and data-plane host
    async fn describe_index(&self, name: &str) -> Result<IndexStatus>;

    /// Insert or overwrite entries by id; returns the number of entries written
    async fn upsert(&self, host: &str, namespace: &str, entries: &[IndexedEntry]) -> Result<usize>;

    /// Top-k similarity query, highest score first
    async fn query(
        &self,
        host: &str,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredMatch>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
