//! The conversational answering chain
//!
//! Condenses a follow-up question against its history, retrieves relevant
//! chunks, and streams a grounded answer terminated by a source-attribution
//! block.

mod condense;
mod conversational;
mod encoder;
mod prompt;
mod retrieve;

pub use condense::QuestionCondenser;
pub use conversational::{AnswerEvent, AnswerStream, ChainState, ConversationalChain};
pub use encoder::{encode_answer_stream, encode_sources, split_sources, SOURCES_SENTINEL_PREFIX};
pub use prompt::PromptBuilder;
pub use retrieve::Retriever;
