//! One-time ingestion: document loading, chunking, and index population

mod chunker;
mod loader;
mod pipeline;

pub use chunker::TextChunker;
pub use loader::{DocumentLoader, LoadedDocument, PageText};
pub use pipeline::{IngestPipeline, IngestReport};
