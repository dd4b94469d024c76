//! Configuration for the document QA service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "DOCCHAT_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Conversational chain configuration
    #[serde(default)]
    pub chain: ChainConfig,
    /// Ingestion configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

impl AppConfig {
    /// Load configuration from the file named by `DOCCHAT_CONFIG` (if set),
    /// then apply environment overrides for secrets and validate.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Pull secrets from the environment, overriding file values
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.index.api_key = key;
        }
    }

    /// Validate invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::config("embedding dimensions must be positive"));
        }
        if self.embeddings.dimensions != self.index.dimension {
            return Err(Error::config(format!(
                "embedding dimensions ({}) must match index dimension ({})",
                self.embeddings.dimensions, self.index.dimension
            )));
        }
        if self.index.index_name.trim().is_empty() {
            return Err(Error::config("index name must not be empty"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::config("OPENAI_API_KEY is not set"));
        }
        if self.index.api_key.trim().is_empty() {
            return Err(Error::config("PINECONE_API_KEY is not set"));
        }
        if self.chain.top_k == 0 {
            return Err(Error::config("chain top_k must be at least 1"));
        }
        if self.chain.max_sources == 0 {
            return Err(Error::config("chain max_sources must be at least 1"));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (1536 for text-embedding-3-small)
    pub dimensions: usize,
    /// Batch size for embedding requests
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 64,
        }
    }
}

/// LLM configuration (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key (overridden by OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: String,
    /// Model used for streamed answer generation
    pub chat_model: String,
    /// Model used for question condensation (non-streaming)
    pub condense_model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4o-mini".to_string(),
            condense_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// Vector index configuration (serverless similarity index)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Control-plane base URL
    pub api_base: String,
    /// API key (overridden by PINECONE_API_KEY)
    #[serde(default)]
    pub api_key: String,
    /// Index name
    pub index_name: String,
    /// Namespace for upserts and queries
    pub namespace: String,
    /// Vector dimension; must match the embedding model
    pub dimension: usize,
    /// Distance metric
    pub metric: String,
    /// Serverless cloud provider
    pub cloud: String,
    /// Serverless region
    pub region: String,
    /// Bounded wait for index readiness after creation, in seconds
    pub provision_timeout_secs: u64,
    /// Readiness poll interval in seconds
    pub poll_interval_secs: u64,
    /// Entries per upsert request
    pub upsert_batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.pinecone.io".to_string(),
            api_key: String::new(),
            index_name: "docchat".to_string(),
            namespace: "default".to_string(),
            dimension: 1536,
            metric: "cosine".to_string(),
            cloud: "gcp".to_string(),
            region: "us-east1".to_string(),
            provision_timeout_secs: 240,
            poll_interval_secs: 5,
            upsert_batch_size: 100,
        }
    }
}

/// Conversational chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chunks retrieved per query
    pub top_k: usize,
    /// Maximum source references attached to an answer
    pub max_sources: usize,
    /// Fall back to the raw question when condensation fails
    pub condense_fallback: bool,
    /// Bound of the token channel between generation and transport
    pub stream_buffer: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            max_sources: 4,
            condense_fallback: true,
            stream_buffer: 32,
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Path of the source document for this deployment's corpus
    pub source_path: PathBuf,
    /// Run ingestion once at startup
    pub ingest_on_startup: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("./data/document.pdf"),
            ingest_on_startup: false,
        }
    }
}
