//! OpenAI-compatible client for embeddings and chat completion

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{LlmProvider, TokenStream};

/// Client for an OpenAI-compatible embeddings + chat completions API
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
    embed_model: String,
    dimensions: usize,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// One parsed server-sent event line
enum SseEvent {
    Token(String),
    Done,
}

/// Parse a single SSE line from a streaming chat completion
fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload == "[DONE]" {
        return Some(SseEvent::Done);
    }
    let chunk: StreamChunk = serde_json::from_str(payload).ok()?;
    let token = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)?;
    if token.is_empty() {
        return None;
    }
    Some(SseEvent::Token(token))
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            config: llm.clone(),
            embed_model: embeddings.model.clone(),
            dimensions: embeddings.dimensions,
            batch_size: embeddings.batch_size.max(1),
        }
    }

    async fn embed_one_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.base_url);
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "embedding request failed: HTTP {status} - {body}"
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse embedding response: {e}")))?;

        // The API is allowed to return data out of order; the index field
        // restores input order.
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() {
            return Err(Error::embedding(format!(
                "embedding count mismatch: sent {}, received {}",
                texts.len(),
                data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    async fn chat(&self, model: &str, prompt: &str, stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            stream,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "completion failed: HTTP {status} - {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_one_batch(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("embedding response was empty"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_one_batch(batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.chat(&self.config.condense_model, prompt, false).await?;
        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("failed to parse completion response: {e}")))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn complete_stream(&self, prompt: &str) -> Result<TokenStream> {
        let response = self.chat(&self.config.chat_model, prompt, true).await?;
        let mut bytes = response.bytes_stream();

        // Forward parsed tokens through a bounded channel; the send side
        // suspends when the consumer is slow (backpressure) and fails when
        // the consumer is gone, which drops the HTTP response and abandons
        // the in-flight generation.
        let (tx, rx) = mpsc::channel::<Result<String>>(32);
        tokio::spawn(async move {
            let mut buffer = String::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(Error::llm(format!("stream transport error: {e}"))))
                            .await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // SSE events are newline-delimited; keep any partial line
                // for the next chunk.
                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    match parse_sse_line(line.trim()) {
                        Some(SseEvent::Token(token)) => {
                            if tx.send(Ok(token)).await.is_err() {
                                tracing::debug!("token consumer dropped, abandoning generation");
                                return;
                            }
                        }
                        Some(SseEvent::Done) => return,
                        None => {}
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.chat_model
    }
}
