//! Stream encoding: tokens plus the trailing sources sentinel
//!
//! The wire format is plain text: every token in production order, and only
//! after successful completion a single sentinel block
//! `\n\n[SOURCES] <json-array>\n` as the final bytes. A failure after
//! tokens have been written ends the byte stream in an error instead, so a
//! partial answer is never presented as complete.

use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::types::SourceRef;

use super::conversational::{AnswerEvent, AnswerStream};

/// Fixed prefix of the sources sentinel block
pub const SOURCES_SENTINEL_PREFIX: &str = "\n\n[SOURCES] ";

/// Serialize the sentinel block for a completed answer
pub fn encode_sources(sources: &[SourceRef]) -> Result<String> {
    Ok(format!(
        "{}{}\n",
        SOURCES_SENTINEL_PREFIX,
        serde_json::to_string(sources)?
    ))
}

/// Encode an answer stream into transport bytes
///
/// Tokens are forwarded as they arrive, unbuffered. The stream ends after
/// the sentinel (success), after an `Err` item (failure mid-generation), or
/// after an `Err` if the producer vanished without a terminal event.
pub fn encode_answer_stream(answer: AnswerStream) -> impl Stream<Item = Result<Bytes>> {
    stream::unfold((answer, false), |(mut answer, done)| async move {
        if done {
            return None;
        }
        match answer.next().await {
            Some(AnswerEvent::Token(token)) => Some((Ok(Bytes::from(token)), (answer, false))),
            Some(AnswerEvent::Completed { sources, .. }) => {
                let sentinel = encode_sources(&sources).map(Bytes::from);
                Some((sentinel, (answer, true)))
            }
            Some(AnswerEvent::Failed(e)) => Some((Err(e), (answer, true))),
            None => Some((
                Err(Error::pipeline("answer stream ended without a terminal event")),
                (answer, true),
            )),
        }
    })
}

/// Locate the sources sentinel in a completed response body
///
/// Trailing-anchor match: the block must be the final bytes of the stream,
/// and the last occurrence of the marker wins, so answer text containing
/// the literal marker does not confuse the parse.
pub fn split_sources(body: &str) -> Option<(&str, Vec<SourceRef>)> {
    let at = body.rfind(SOURCES_SENTINEL_PREFIX)?;
    let tail = &body[at + SOURCES_SENTINEL_PREFIX.len()..];
    let json = tail.strip_suffix('\n')?;
    let sources: Vec<SourceRef> = serde_json::from_str(json).ok()?;
    Some((&body[..at], sources))
}
