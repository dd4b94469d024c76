//! End-to-end chain tests over mock providers: streaming contract,
//! source attribution, and failure propagation.

use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docchat_rag::chain::{encode_answer_stream, split_sources, AnswerEvent, ConversationalChain};
use docchat_rag::config::AppConfig;
use docchat_rag::error::{Error, Result};
use docchat_rag::gateway::IndexGateway;
use docchat_rag::providers::{
    index::{IndexSpec, IndexStatus, ScoredMatch},
    llm::TokenStream,
    EmbeddingProvider, LlmProvider, VectorIndexService,
};
use docchat_rag::types::{
    ChatHistory, ChunkMetadata, ConversationTurn, EntryMetadata, IndexedEntry,
};

// ---------------------------------------------------------------------------
// Mock providers
// ---------------------------------------------------------------------------

/// Deterministic embedder that records the last embedded text
struct MockEmbedder {
    last_text: Mutex<Option<String>>,
}

impl MockEmbedder {
    fn new() -> Self {
        Self {
            last_text: Mutex::new(None),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        *self.last_text.lock() = Some(text.to_string());
        Ok(vec![0.1; 8])
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn name(&self) -> &str {
        "mock-embedder"
    }
}

/// What the mock LLM streams back for the QA generation
#[derive(Clone)]
enum GenerationScript {
    Tokens(Vec<&'static str>),
    TokensThenError(Vec<&'static str>),
    FailImmediately,
    /// Never-ending token stream; the flag is set when the stream is
    /// dropped, i.e. when generation was abandoned
    Endless(Arc<AtomicBool>),
}

/// Sets its flag when dropped
struct DropSignal(Arc<AtomicBool>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct MockLlm {
    condensed: &'static str,
    script: GenerationScript,
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.condensed.to_string())
    }

    async fn complete_stream(&self, _prompt: &str) -> Result<TokenStream> {
        match self.script.clone() {
            GenerationScript::Tokens(tokens) => {
                let items: Vec<Result<String>> =
                    tokens.into_iter().map(|t| Ok(t.to_string())).collect();
                Ok(Box::pin(futures_util::stream::iter(items)))
            }
            GenerationScript::TokensThenError(tokens) => {
                let mut items: Vec<Result<String>> =
                    tokens.into_iter().map(|t| Ok(t.to_string())).collect();
                items.push(Err(Error::llm("generation interrupted")));
                Ok(Box::pin(futures_util::stream::iter(items)))
            }
            GenerationScript::FailImmediately => Err(Error::llm("model rejected the request")),
            GenerationScript::Endless(flag) => {
                let signal = DropSignal(flag);
                Ok(Box::pin(futures_util::stream::unfold(
                    signal,
                    |signal| async move {
                        let item: Result<String> = Ok("token ".to_string());
                        Some((item, signal))
                    },
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "mock-llm"
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Index service returning canned matches (or a scripted failure)
struct MockIndexService {
    matches: Vec<ScoredMatch>,
    fail_queries: bool,
}

#[async_trait]
impl VectorIndexService for MockIndexService {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        Ok(vec!["docchat".to_string()])
    }

    async fn create_index(&self, _spec: &IndexSpec) -> Result<()> {
        Ok(())
    }

    async fn describe_index(&self, _name: &str) -> Result<IndexStatus> {
        Ok(IndexStatus {
            ready: true,
            host: Some("mem".to_string()),
        })
    }

    async fn upsert(&self, _host: &str, _namespace: &str, entries: &[IndexedEntry]) -> Result<usize> {
        Ok(entries.len())
    }

    async fn query(
        &self,
        _host: &str,
        _namespace: &str,
        _vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredMatch>> {
        if self.fail_queries {
            return Err(Error::index_query("index unavailable"));
        }
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    fn name(&self) -> &str {
        "mock-index"
    }
}

fn warranty_matches(n: usize) -> Vec<ScoredMatch> {
    (0..n)
        .map(|i| ScoredMatch {
            id: format!("doc-{i}"),
            score: 0.95 - i as f32 * 0.05,
            metadata: Some(EntryMetadata {
                text: format!("Warranty clause {i}: parts are covered for 12 months."),
                info: ChunkMetadata {
                    source: Some("manual.pdf".to_string()),
                    page: Some(i as u32 + 1),
                    ..Default::default()
                },
            }),
        })
        .collect()
}

fn build_chain(
    embedder: Arc<MockEmbedder>,
    llm: MockLlm,
    index: MockIndexService,
) -> ConversationalChain {
    let config = AppConfig::default();
    let gateway = Arc::new(IndexGateway::new(Arc::new(index), config.index.clone()));
    ConversationalChain::new(&config, embedder, Arc::new(llm), gateway)
}

/// Drain an encoded stream into (successful chunks, error if any)
async fn collect(
    stream: impl futures_util::Stream<Item = Result<bytes::Bytes>>,
) -> (Vec<String>, Option<Error>) {
    let mut chunks = Vec::new();
    let mut error = None;
    let mut stream = std::pin::pin!(stream);
    while let Some(item) = stream.next().await {
        match item {
            Ok(bytes) => chunks.push(String::from_utf8_lossy(&bytes).to_string()),
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }
    (chunks, error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_question_streams_answer_and_sources() {
    let embedder = Arc::new(MockEmbedder::new());
    let chain = build_chain(
        embedder.clone(),
        MockLlm {
            condensed: "unused: empty history skips condensation",
            script: GenerationScript::Tokens(vec!["Refunds ", "take ", "14 days."]),
        },
        MockIndexService {
            matches: warranty_matches(6),
            fail_queries: false,
        },
    );

    let answer = chain
        .run("What is the refund policy?", &ChatHistory::default())
        .await
        .unwrap();
    let (chunks, error) = collect(encode_answer_stream(answer)).await;

    assert!(error.is_none());
    let body: String = chunks.concat();
    let (text, sources) = split_sources(&body).expect("stream must end with a sources sentinel");
    assert_eq!(text, "Refunds take 14 days.");

    // Retrieval used the question verbatim (no condensation without history).
    assert_eq!(
        embedder.last_text.lock().as_deref(),
        Some("What is the refund policy?")
    );

    // At most 4 sources, ids 1..N without gaps, retrieval order preserved.
    assert_eq!(sources.len(), 4);
    assert_eq!(sources.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(sources[0].meta.source, "manual.pdf");
    assert_eq!(sources[0].meta.page, Some(1));
    assert!(sources[0].snippet.contains("Warranty clause 0"));
}

#[tokio::test]
async fn follow_up_question_retrieves_with_the_condensed_form() {
    let embedder = Arc::new(MockEmbedder::new());
    let chain = build_chain(
        embedder.clone(),
        MockLlm {
            condensed: "What is the warranty period for parts?",
            script: GenerationScript::Tokens(vec!["12 months."]),
        },
        MockIndexService {
            matches: warranty_matches(2),
            fail_queries: false,
        },
    );

    let history = ChatHistory::Turns(vec![
        ConversationTurn::user("What's the warranty?"),
        ConversationTurn::assistant("12 months."),
    ]);
    let answer = chain.run("And for parts?", &history).await.unwrap();
    let (chunks, error) = collect(encode_answer_stream(answer)).await;
    assert!(error.is_none());
    assert!(chunks.concat().starts_with("12 months."));

    let embedded = embedder.last_text.lock().clone().unwrap();
    assert!(embedded.contains("warranty"));
    assert!(embedded.contains("parts"));
}

#[tokio::test]
async fn empty_retrieval_still_completes_with_an_empty_sources_array() {
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::Tokens(vec!["I don't know."]),
        },
        MockIndexService {
            matches: Vec::new(),
            fail_queries: false,
        },
    );

    let answer = chain
        .run("What is the meaning of life?", &ChatHistory::default())
        .await
        .unwrap();
    let (chunks, error) = collect(encode_answer_stream(answer)).await;

    assert!(error.is_none());
    let body = chunks.concat();
    assert!(body.ends_with("\n\n[SOURCES] []\n"));
    let (_, sources) = split_sources(&body).unwrap();
    assert!(sources.is_empty());
}

#[tokio::test]
async fn retrieval_failure_produces_no_stream_at_all() {
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::Tokens(vec!["never emitted"]),
        },
        MockIndexService {
            matches: Vec::new(),
            fail_queries: true,
        },
    );

    let err = chain
        .run("What is the refund policy?", &ChatHistory::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IndexQuery(_)));
}

#[tokio::test]
async fn generation_failure_before_any_token_is_a_clean_error() {
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::FailImmediately,
        },
        MockIndexService {
            matches: warranty_matches(2),
            fail_queries: false,
        },
    );

    let err = chain
        .run("What is the refund policy?", &ChatHistory::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn generation_failure_after_tokens_aborts_without_a_sentinel() {
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::TokensThenError(vec!["The warranty ", "covers "]),
        },
        MockIndexService {
            matches: warranty_matches(2),
            fail_queries: false,
        },
    );

    let answer = chain
        .run("What does the warranty cover?", &ChatHistory::default())
        .await
        .unwrap();
    let (chunks, error) = collect(encode_answer_stream(answer)).await;

    // Tokens already delivered stay delivered, then the stream errors.
    assert_eq!(chunks, vec!["The warranty ".to_string(), "covers ".to_string()]);
    assert!(matches!(error, Some(Error::Llm(_))));

    // No sentinel anywhere in what was written.
    let body = chunks.concat();
    assert!(split_sources(&body).is_none());
}

#[tokio::test]
async fn completion_event_carries_the_full_answer() {
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::Tokens(vec!["The warranty ", "lasts ", "12 months."]),
        },
        MockIndexService {
            matches: warranty_matches(2),
            fail_queries: false,
        },
    );

    let mut answer = chain
        .run("How long is the warranty?", &ChatHistory::default())
        .await
        .unwrap();

    let mut streamed = String::new();
    let mut completed = false;
    while let Some(event) = answer.next().await {
        match event {
            AnswerEvent::Token(token) => streamed.push_str(&token),
            AnswerEvent::Completed { answer, sources } => {
                assert_eq!(answer, streamed);
                assert_eq!(answer, "The warranty lasts 12 months.");
                assert_eq!(sources.len(), 2);
                completed = true;
            }
            AnswerEvent::Failed(e) => panic!("unexpected failure: {e}"),
        }
    }
    assert!(completed);
}

#[tokio::test]
async fn dropping_the_consumer_cancels_generation() {
    let abandoned = Arc::new(AtomicBool::new(false));
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::Endless(abandoned.clone()),
        },
        MockIndexService {
            matches: warranty_matches(1),
            fail_queries: false,
        },
    );

    let mut answer = chain
        .run("keep talking forever", &ChatHistory::default())
        .await
        .unwrap();
    assert!(matches!(answer.next().await, Some(AnswerEvent::Token(_))));

    // Disconnecting the consumer must abandon the in-flight generation.
    drop(answer);
    for _ in 0..200 {
        if abandoned.load(Ordering::SeqCst) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(abandoned.load(Ordering::SeqCst));
}

#[tokio::test]
async fn tokens_arrive_in_production_order() {
    let tokens = vec!["alpha ", "beta ", "gamma ", "delta"];
    let chain = build_chain(
        Arc::new(MockEmbedder::new()),
        MockLlm {
            condensed: "unused",
            script: GenerationScript::Tokens(tokens.clone()),
        },
        MockIndexService {
            matches: warranty_matches(1),
            fail_queries: false,
        },
    );

    let answer = chain.run("order test", &ChatHistory::default()).await.unwrap();
    let (chunks, error) = collect(encode_answer_stream(answer)).await;
    assert!(error.is_none());

    // All token chunks precede the sentinel chunk, in order.
    let produced: Vec<_> = chunks[..tokens.len()].to_vec();
    assert_eq!(produced, tokens);
    assert!(chunks.last().unwrap().starts_with("\n\n[SOURCES] "));
}
