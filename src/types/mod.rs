//! Data model: conversations, chunks, and source references

pub mod conversation;
pub mod document;
pub mod source_ref;

pub use conversation::{ChatHistory, ChatRequest, ConversationTurn, Role};
pub use document::{ChunkDocument, ChunkMetadata, EntryMetadata, IndexedEntry, PageLocation, RetrievedChunk};
pub use source_ref::{SourceMeta, SourceRef};
