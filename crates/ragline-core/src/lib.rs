//! Ragline Core Library
//!
//! Retrieval-augmented question answering over embedded document collections.
//!
//! # Features
//! - Layered-separator text segmentation with source attribution
//! - Batched, order-preserving embedding over HTTP (TEI-compatible `/embed`)
//! - SQLite-backed vector collections with inner-product HNSW search
//! - Cross-encoder reranking with strict relevance thresholds
//! - Follow-up query rewriting, bounded conversation history and prompt admission control

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod llm;
pub mod locks;
pub mod providers;
pub mod search;

pub use chat::{
    AdmissionControl, AdmissionReport, ConversationHistory, PromptAssembler, QueryContext,
    QueryPipeline,
};
pub use config::{
    ChatConfig, ChunkingConfig, Config, EmbeddingServiceConfig, LLMServiceConfig, LoaderConfig,
    RerankerServiceConfig, RetrievalConfig, VectorStoreConfig,
};
pub use db::{CollectionInfo, Database, NewRecord, SearchHit, VectorStore};
pub use error::{RaglineError, Error, Result};
pub use index::{Chunk, DocumentRecord, EmbeddingClient, IngestStats, IngestionPipeline, Segmenter};
pub use llm::{
    ChatMessage, Embedder, HttpEmbedder, HttpReranker, LLMClient, MetricsSnapshot, QueryRewriter,
    RerankResult, Reranker, Role, Tokenizer, VLLMClient,
};
pub use locks::CollectionLocks;
pub use providers::{FileLoader, SourceLoader, SourceRegistry, TextFilter, URLLoader};
pub use search::{AnnIndex, ScoredChunk};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "ragline";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "ragline";
