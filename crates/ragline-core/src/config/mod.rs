//! Configuration management

use crate::error::{RaglineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest chunk size the segmenter accepts (leaves room for the source prefix)
pub const MIN_CHUNK_CHARS: usize = 64;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat completion and tokenizer service
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Embedding service
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,

    /// Reranking service
    #[serde(default)]
    pub reranker: RerankerServiceConfig,

    /// Vector store tuning
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Segmentation of source documents
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval and relevance filtering
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Conversation and prompt limits
    #[serde(default)]
    pub chat: ChatConfig,

    /// Source loading
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// LLM service configuration (OpenAI-compatible, e.g. vLLM)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service; `/v1/chat/completions` and `/tokenize` hang off it
    pub url: String,

    /// Model name for chat completions and tokenization
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGLINE_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            api_key: std::env::var("RAGLINE_LLM_API_KEY").ok(),
            timeout_secs: default_llm_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("RAGLINE_LLM_MODEL")
        .unwrap_or_else(|_| "Qwen/Qwen2.5-7B-Instruct".to_string())
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

/// Embedding service configuration (text-embeddings-inference style `/embed`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the embedding service
    pub url: String,

    /// Output dimension D; fixed for the life of a collection
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Texts per `/embed` request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches in flight at once (1 = sequential)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Request timeout in seconds
    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGLINE_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_service_timeout(),
        }
    }
}

fn default_dimensions() -> usize {
    std::env::var("RAGLINE_EMBEDDING_DIMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1024)
}

fn default_batch_size() -> usize {
    32
}

fn default_max_concurrent() -> usize {
    1
}

fn default_service_timeout() -> u64 {
    60
}

/// Reranking service configuration (`/rerank`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerServiceConfig {
    /// Base URL of the reranking service
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl Default for RerankerServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGLINE_RERANKER_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            timeout_secs: default_service_timeout(),
        }
    }
}

/// Vector store tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Minimum record count before an ANN index is built; smaller collections are scanned exactly
    #[serde(default = "default_ann_threshold")]
    pub ann_threshold: usize,

    /// HNSW construction breadth
    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,

    /// HNSW search breadth
    #[serde(default = "default_ef_search")]
    pub ef_search: usize,

    /// Candidates fetched per requested result, so deduplication cannot starve the top-k
    #[serde(default = "default_over_fetch")]
    pub over_fetch: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            ann_threshold: default_ann_threshold(),
            ef_construction: default_ef_construction(),
            ef_search: default_ef_search(),
            over_fetch: default_over_fetch(),
        }
    }
}

fn default_ann_threshold() -> usize {
    1000
}

fn default_ef_construction() -> usize {
    100
}

fn default_ef_search() -> usize {
    64
}

fn default_over_fetch() -> usize {
    3
}

/// Segmentation settings, in characters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default)]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap_chars: 0,
        }
    }
}

fn default_max_chars() -> usize {
    1250
}

/// Retrieval and relevance filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Nearest neighbours fetched from the vector store
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    /// Rerank score a chunk must strictly exceed to reach the prompt
    #[serde(default = "default_min_score")]
    pub rerank_min_score: f64,

    /// Maximum chunks placed in the prompt
    #[serde(default = "default_prompt_top_k")]
    pub prompt_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_top_k: default_search_top_k(),
            rerank_min_score: default_min_score(),
            prompt_top_k: default_prompt_top_k(),
        }
    }
}

fn default_search_top_k() -> usize {
    15
}

fn default_min_score() -> f64 {
    0.2
}

fn default_prompt_top_k() -> usize {
    5
}

/// Conversation and prompt limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Turns (user + assistant pairs) kept in history
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Token budget for the assembled prompt
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    /// Replaces the built-in system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_input_tokens: default_max_input_tokens(),
            system_instruction: None,
        }
    }
}

fn default_max_turns() -> usize {
    5
}

fn default_max_input_tokens() -> usize {
    6000
}

/// Source loading and text filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Lines with fewer words are dropped
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// A document is cut at the first line containing any of these
    #[serde(default)]
    pub stop_phrases: Vec<String>,

    /// HTTP fetch timeout in seconds
    #[serde(default = "default_loader_timeout")]
    pub timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            stop_phrases: Vec::new(),
            timeout_secs: default_loader_timeout(),
        }
    }
}

fn default_min_words() -> usize {
    3
}

fn default_loader_timeout() -> u64 {
    10
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a specific path; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject settings the pipelines cannot honor
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| -> Result<()> { Err(RaglineError::Config(msg.to_string())) };

        if self.embedding.dimensions == 0 {
            return fail("embedding.dimensions must be greater than zero");
        }
        if self.embedding.batch_size == 0 {
            return fail("embedding.batch_size must be greater than zero");
        }
        if self.embedding.max_concurrent == 0 {
            return fail("embedding.max_concurrent must be greater than zero");
        }
        if self.chunking.max_chars < MIN_CHUNK_CHARS {
            return Err(RaglineError::Config(format!(
                "chunking.max_chars must be at least {}",
                MIN_CHUNK_CHARS
            )));
        }
        if self.chunking.overlap_chars >= self.chunking.max_chars {
            return fail("chunking.overlap_chars must be smaller than chunking.max_chars");
        }
        if self.retrieval.search_top_k == 0 {
            return fail("retrieval.search_top_k must be greater than zero");
        }
        if self.retrieval.prompt_top_k == 0 {
            return fail("retrieval.prompt_top_k must be greater than zero");
        }
        if self.chat.max_turns == 0 {
            return fail("chat.max_turns must be greater than zero");
        }
        if self.chat.max_input_tokens == 0 {
            return fail("chat.max_input_tokens must be greater than zero");
        }
        if self.vector_store.over_fetch == 0 {
            return fail("vector_store.over_fetch must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.max_chars, 1250);
        assert_eq!(config.retrieval.search_top_k, 15);
        assert_eq!(config.loader.min_words, 3);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "chunking:\n  max_chars: 500\n  overlap_chars: 50\nchat:\n  max_turns: 2\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chunking.max_chars, 500);
        assert_eq!(config.chunking.overlap_chars, 50);
        assert_eq!(config.chat.max_turns, 2);
        assert_eq!(config.chat.max_input_tokens, 6000);
        assert_eq!(config.retrieval.prompt_top_k, 5);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = Config::default();
        config.chunking.overlap_chars = config.chunking.max_chars;
        assert!(matches!(config.validate(), Err(RaglineError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = Config::default();
        config.embedding.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.retrieval.rerank_min_score = 0.5;
        config.loader.stop_phrases = vec!["Cookie policy".to_string()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.retrieval.rerank_min_score, 0.5);
        assert_eq!(loaded.loader.stop_phrases, vec!["Cookie policy".to_string()]);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(temp.path().join("absent.yml")).unwrap();
        assert_eq!(config.chat.max_turns, 5);
    }
}
