//! External model services
//!
//! Provides traits and HTTP implementations for:
//! - Embedding generation (text-embeddings-inference style `/embed`)
//! - Cross-encoder reranking (`/rerank`)
//! - Chat completion and tokenization (OpenAI-compatible, e.g. vLLM)
//! - Follow-up query rewriting on top of the chat client

mod client;
mod http_embedder;
mod http_reranker;
mod query_rewriter;
mod traits;

pub use client::{ChatMessage, MetricsSnapshot, Role, VLLMClient};
pub use http_embedder::HttpEmbedder;
pub use http_reranker::HttpReranker;
pub use query_rewriter::{QueryRewriter, REWRITE_MAX_CHARS};
pub use traits::*;
