//! HTTP client for OpenAI-compatible LLM services (vLLM, OpenAI, etc.)

use super::{LLMClient, Tokenizer};
use crate::config::LLMServiceConfig;
use crate::error::{RaglineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// vLLM/OpenAI-compatible client
pub struct VLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    metrics: Arc<APIMetrics>,
}

impl VLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RaglineError::Http)?;

        Ok(Self {
            http_client,
            config,
            metrics: Arc::new(APIMetrics::default()),
        })
    }


    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.http_client.post(url);
        match self.config.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct TokenizeRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct TokenizeResponse {
    tokens: Vec<u32>,
}

#[async_trait]
impl LLMClient for VLLMClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = self.endpoint("/v1/chat/completions");
        let response = self.post(&url).json(&request).send().await.map_err(|e| {
            self.record_error();
            RaglineError::Http(e)
        })?;

        if !response.status().is_success() {
            self.record_error();
            return Err(RaglineError::from_response("llm", response).await);
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.record_error();
            RaglineError::Http(e)
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                self.record_error();
                RaglineError::Llm("No response from LLM".to_string())
            })?
            .message
            .content;

        self.record_latency(start);
        tracing::debug!(
            "Chat completion: {} chars in {} ms",
            content.len(),
            start.elapsed().as_millis()
        );

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Tokenizer for VLLMClient {
    async fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = TokenizeRequest {
            model: &self.config.model,
            prompt: text,
        };

        let url = self.endpoint("/tokenize");
        let response = self.post(&url).json(&request).send().await.map_err(|e| {
            self.record_error();
            RaglineError::Http(e)
        })?;

        if !response.status().is_success() {
            self.record_error();
            return Err(RaglineError::from_response("tokenizer", response).await);
        }

        let parsed: TokenizeResponse = response.json().await.map_err(|e| {
            self.record_error();
            RaglineError::Http(e)
        })?;

        self.record_latency(start);
        Ok(parsed.tokens)
    }
}
