//! Provider abstractions for embeddings, LLM completion, and the vector index
//!
//! Trait seams keep the external services swappable and mockable; the
//! concrete bindings are an OpenAI-compatible API and a serverless
//! Pinecone index.

pub mod embedding;
pub mod index;
pub mod llm;
pub mod openai;
pub mod pinecone;

pub use embedding::EmbeddingProvider;
pub use index::{IndexSpec, IndexStatus, ScoredMatch, VectorIndexService};
pub use llm::{LlmProvider, TokenStream};
pub use openai::OpenAiClient;
pub use pinecone::PineconeClient;
