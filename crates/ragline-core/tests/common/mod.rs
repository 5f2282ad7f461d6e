//! In-process fakes for the model services and source loading

#![allow(dead_code)]

use async_trait::async_trait;
use ragline_core::{
    ChatMessage, CollectionLocks, Config, Database, DocumentRecord, Embedder, EmbeddingClient,
    IngestionPipeline, LLMClient, QueryPipeline, RaglineError, RerankResult, Reranker, Result,
    Segmenter, SourceLoader, Tokenizer, VectorStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DIMS: usize = 8;

/// Normalized byte histogram; deterministic and cheap
pub struct HashEmbedder {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl HashEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }
}

pub fn embed_text(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    for b in text.bytes() {
        v[b as usize % DIMS] += 1.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RaglineError::UpstreamService {
                service: "embedding",
                status: 503,
                body: "embedding service unavailable".into(),
            });
        }
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn model_name(&self) -> &str {
        "hash"
    }
}

/// Scores texts containing `needle` high and everything else low
pub struct KeywordReranker {
    pub needle: String,
    pub hit_score: f64,
    pub miss_score: f64,
    pub fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl KeywordReranker {
    pub fn new(needle: &str, hit_score: f64, miss_score: f64) -> Arc<Self> {
        Arc::new(Self {
            needle: needle.to_string(),
            hit_score,
            miss_score,
            fail: false,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            needle: String::new(),
            hit_score: 0.0,
            miss_score: 0.0,
            fail: true,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Reranker for KeywordReranker {
    async fn rerank(&self, query: &str, texts: &[String]) -> Result<Vec<RerankResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(RaglineError::UpstreamService {
                service: "reranker",
                status: 500,
                body: "reranker crashed".into(),
            });
        }
        // Reverse order on the wire, like an unsorted service response
        Ok(texts
            .iter()
            .enumerate()
            .rev()
            .map(|(index, text)| RerankResult {
                index,
                score: if text.contains(&self.needle) {
                    self.hit_score
                } else {
                    self.miss_score
                },
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Records every request; rewrites and answers are told apart by the system prompt
pub struct RecordingLLM {
    pub rewrite: String,
    pub answers: AtomicUsize,
    pub rewrites: AtomicUsize,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingLLM {
    pub fn new(rewrite: &str) -> Arc<Self> {
        Arc::new(Self {
            rewrite: rewrite.to_string(),
            answers: AtomicUsize::new(0),
            rewrites: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn answer_calls(&self) -> usize {
        self.answers.load(Ordering::SeqCst)
    }

    pub fn rewrite_calls(&self) -> usize {
        self.rewrites.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for RecordingLLM {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let is_rewrite = messages
            .first()
            .map(|m| m.content.contains("Never answer the question"))
            .unwrap_or(false);
        self.requests.lock().unwrap().push(messages);

        if is_rewrite {
            self.rewrites.fetch_add(1, Ordering::SeqCst);
            return Ok(self.rewrite.clone());
        }
        let n = self.answers.fetch_add(1, Ordering::SeqCst);
        Ok(format!("answer {}", n + 1))
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// One token per whitespace-separated word
pub struct WordTokenizer;

#[async_trait]
impl Tokenizer for WordTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        Ok(text.split_whitespace().map(|_| 1).collect())
    }
}

/// Serves documents from a map; unknown sources fail
pub struct MapLoader {
    pub docs: HashMap<String, DocumentRecord>,
}

impl MapLoader {
    pub fn new(docs: Vec<DocumentRecord>) -> Arc<Self> {
        Arc::new(Self {
            docs: docs.into_iter().map(|d| (d.source.clone(), d)).collect(),
        })
    }
}

#[async_trait]
impl SourceLoader for MapLoader {
    fn loader_type(&self) -> &'static str {
        "map"
    }

    async fn load(&self, source: &str) -> Result<Vec<DocumentRecord>> {
        self.docs
            .get(source)
            .cloned()
            .map(|d| vec![d])
            .ok_or_else(|| RaglineError::Source(format!("unknown source {}", source)))
    }
}

pub fn store() -> Arc<Database> {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    Arc::new(db)
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.chat.max_turns = 3;
    config.chat.max_input_tokens = 5000;
    config.retrieval.search_top_k = 10;
    config.retrieval.rerank_min_score = 0.2;
    config.retrieval.prompt_top_k = 5;
    config.embedding.batch_size = 2;
    config
}

pub struct Harness {
    pub store: Arc<Database>,
    pub embedder: Arc<HashEmbedder>,
    pub reranker: Arc<KeywordReranker>,
    pub llm: Arc<RecordingLLM>,
    pub locks: CollectionLocks,
    pub config: Config,
}

impl Harness {
    pub fn new(reranker: Arc<KeywordReranker>) -> Self {
        Self {
            store: store(),
            embedder: HashEmbedder::new(),
            reranker,
            llm: RecordingLLM::new("rewritten standalone query"),
            locks: CollectionLocks::new(),
            config: test_config(),
        }
    }

    pub fn embeddings(&self) -> EmbeddingClient {
        EmbeddingClient::from_config(self.embedder.clone(), &self.config.embedding)
    }

    pub fn query_pipeline(&self) -> QueryPipeline {
        QueryPipeline::new(
            self.llm.clone(),
            Arc::new(WordTokenizer),
            self.embeddings(),
            self.reranker.clone(),
            self.store.clone(),
            self.locks.clone(),
            &self.config,
        )
    }

    pub fn ingestion_pipeline(
        &self,
        loader: Arc<dyn SourceLoader>,
        segmenter: Segmenter,
    ) -> IngestionPipeline {
        IngestionPipeline::new(
            loader,
            segmenter,
            self.embeddings(),
            self.store.clone(),
            self.locks.clone(),
        )
    }

    /// Create `collection` holding the given chunk texts directly
    pub fn seed_collection(&self, collection: &str, texts: &[&str]) {
        let records: Vec<_> = texts
            .iter()
            .map(|t| ragline_core::NewRecord::new(embed_text(t), *t))
            .collect();
        let store: &dyn VectorStore = self.store.as_ref();
        store.create_collection(collection, DIMS).unwrap();
        store.insert_records(collection, &records).unwrap();
        store.ensure_indexed(collection).unwrap();
    }
}
