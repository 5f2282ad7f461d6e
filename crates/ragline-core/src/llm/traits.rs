//! Service trait definitions
//!
//! The pipelines only see these traits, so tests substitute in-process fakes.

use super::ChatMessage;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| crate::error::RaglineError::Llm("No embedding returned".to_string()))
    }

    /// Generate embeddings for one batch of texts in a single request.
    /// Output position `i` corresponds to input position `i`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Document reranking trait
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score every text against the query. The result order is unspecified.
    async fn rerank(&self, query: &str, texts: &[String]) -> Result<Vec<RerankResult>>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Reranking result, addressed by position in the request's `texts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    pub index: usize,
    pub score: f64,
}

/// Chat completion trait
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Tokenization trait
#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Tokenize text
    async fn tokenize(&self, text: &str) -> Result<Vec<u32>>;

    /// Count tokens
    async fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.tokenize(text).await?.len())
    }
}
