//! Pinecone serverless index client
//!
//! Control-plane calls (list/create/describe) go to the API base; data-plane
//! calls (upsert/query) go to the per-index host resolved during
//! provisioning.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::IndexedEntry;

use super::index::{IndexSpec, IndexStatus, ScoredMatch, VectorIndexService};

const API_KEY_HEADER: &str = "Api-Key";

/// HTTP client for the Pinecone serverless API
pub struct PineconeClient {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexListEntry>,
}

#[derive(Deserialize)]
struct IndexListEntry {
    name: String,
}

#[derive(Deserialize)]
struct IndexDescription {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatusBody>,
}

#[derive(Deserialize)]
struct IndexStatusBody {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: ServerlessWrapper<'a>,
}

#[derive(Serialize)]
struct ServerlessWrapper<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexedEntry],
    namespace: &'a str,
}

#[derive(Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    namespace: &'a str,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredMatch>,
}

impl PineconeClient {
    /// Create a new client
    pub fn new(config: &IndexConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// The describe endpoint returns a bare hostname; data-plane requests
    /// need a scheme.
    fn data_plane_url(host: &str, path: &str) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host.trim_end_matches('/'), path)
        } else {
            format!("https://{}{}", host.trim_end_matches('/'), path)
        }
    }
}

#[async_trait]
impl VectorIndexService for PineconeClient {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        let url = format!("{}/indexes", self.api_base);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Error::provisioning(format!("list indexes failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::provisioning(format!(
                "list indexes failed: HTTP {}",
                response.status()
            )));
        }

        let parsed: IndexList = response
            .json()
            .await
            .map_err(|e| Error::provisioning(format!("failed to parse index list: {e}")))?;

        Ok(parsed.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let url = format!("{}/indexes", self.api_base);
        let request = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: ServerlessWrapper {
                serverless: ServerlessSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provisioning(format!("create index failed: {e}")))?;

        // A concurrent creator may have won the race; the index existing is
        // the outcome we wanted.
        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(index = %spec.name, "index already exists");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provisioning(format!(
                "create index failed: HTTP {status} - {body}"
            )));
        }

        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexStatus> {
        let url = format!("{}/indexes/{}", self.api_base, name);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Error::provisioning(format!("describe index failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::provisioning(format!(
                "describe index failed: HTTP {}",
                response.status()
            )));
        }

        let parsed: IndexDescription = response
            .json()
            .await
            .map_err(|e| Error::provisioning(format!("failed to parse index description: {e}")))?;

        Ok(IndexStatus {
            ready: parsed.status.map(|s| s.ready).unwrap_or(false),
            host: parsed.host,
        })
    }

    async fn upsert(&self, host: &str, namespace: &str, entries: &[IndexedEntry]) -> Result<usize> {
        let url = Self::data_plane_url(host, "/vectors/upsert");
        let request = UpsertRequest {
            vectors: entries,
            namespace,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::index_write(format!("upsert failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::index_write(format!(
                "upsert failed: HTTP {status} - {body}"
            )));
        }

        let parsed: UpsertResponse = response
            .json()
            .await
            .map_err(|e| Error::index_write(format!("failed to parse upsert response: {e}")))?;

        Ok(parsed.upserted_count)
    }

    async fn query(
        &self,
        host: &str,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredMatch>> {
        let url = Self::data_plane_url(host, "/query");
        let request = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::index_query(format!("query failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::index_query(format!(
                "query failed: HTTP {status} - {body}"
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::index_query(format!("failed to parse query response: {e}")))?;

        Ok(parsed.matches)
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
