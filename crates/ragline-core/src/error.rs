//! Error types for ragline

use thiserror::Error;

/// Result type alias using RaglineError
pub type Result<T> = std::result::Result<T, RaglineError>;

/// Error type alias for convenience
pub type Error = RaglineError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const OVERSIZE_PROMPT: i32 = 4;
}

/// Main error type for ragline
#[derive(Debug, Error)]
pub enum RaglineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Non-success response from the embedding, reranking, chat or tokenizer service
    #[error("{service} service error (HTTP {status}): {body}")]
    UpstreamService {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Admission control rejected the assembled prompt; no answer was generated
    #[error("Prompt too large: {tokens} tokens ({chars} chars) exceeds the input budget of {budget} tokens")]
    OversizePrompt {
        tokens: usize,
        budget: usize,
        chars: usize,
    },

    #[error("Embedding dimension mismatch for '{collection}': expected {expected}, got {actual}")]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RaglineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CollectionNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::OversizePrompt { .. } => exit_codes::OVERSIZE_PROMPT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Build an upstream error from a non-success HTTP response, consuming its body
    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::UpstreamService {
            service,
            status,
            body,
        }
    }
}
