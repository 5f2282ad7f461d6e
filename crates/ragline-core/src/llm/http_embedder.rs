//! HTTP-based embedder using an external embedding service
//!
//! Speaks the text-embeddings-inference wire format:
//! `POST /embed {"inputs": [...]}` returning `[[f32; D], ...]`.

use super::Embedder;
use crate::config::EmbeddingServiceConfig;
use crate::error::{RaglineError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Embedder that uses an external HTTP service
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }


    fn endpoint(&self) -> String {
        format!("{}/embed", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let response = self
            .http_client
            .post(self.endpoint())
            .json(&EmbedRequest { inputs: texts })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RaglineError::from_response("embedding", response).await);
        }

        let embeddings: Vec<Vec<f32>> = response.json().await?;
        validate_embeddings(&embeddings, texts.len(), self.config.dimensions)?;

        tracing::debug!(
            "Embedded {} texts in {} ms",
            texts.len(),
            start.elapsed().as_millis()
        );
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.url
    }
}

fn validate_embeddings(embeddings: &[Vec<f32>], expected_count: usize, dims: usize) -> Result<()> {
    if embeddings.len() != expected_count {
        return Err(RaglineError::Llm(format!(
            "Embedding service returned {} vectors for {} inputs",
            embeddings.len(),
            expected_count
        )));
    }
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dims) {
        return Err(RaglineError::Llm(format!(
            "Embedding service returned {}-dimensional vectors, expected {}",
            bad.len(),
            dims
        )));
    }
    Ok(())
}
