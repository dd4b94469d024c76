//! docchat-rag: conversational document QA with retrieval-augmented answers
//!
//! Turns a fixed document corpus into a searchable vector index and answers
//! multi-turn questions about it, streaming each answer token-by-token with
//! a trailing, machine-parseable source-attribution block.

pub mod chain;
pub mod config;
pub mod error;
pub mod gateway;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod types;

pub use chain::{AnswerEvent, AnswerStream, ConversationalChain};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use gateway::IndexGateway;
pub use ingestion::IngestPipeline;
pub use types::{ChatHistory, ChatRequest, ConversationTurn, RetrievedChunk, SourceRef};
