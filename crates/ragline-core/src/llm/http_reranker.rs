//! HTTP-based reranker using an external cross-encoder service
//!
//! Wire format: `POST /rerank {"query": ..., "texts": [...]}` returning
//! `[{"index": i, "score": s}, ...]` in no particular order.

use super::{RerankResult, Reranker};
use crate::config::RerankerServiceConfig;
use crate::error::{RaglineError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Reranker using external HTTP service
pub struct HttpReranker {
    http_client: reqwest::Client,
    config: RerankerServiceConfig,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [String],
}

impl HttpReranker {
    /// Create from configuration
    pub fn new(config: RerankerServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

}

#[async_trait]
impl Reranker for HttpReranker {
    async fn rerank(&self, query: &str, texts: &[String]) -> Result<Vec<RerankResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let url = format!("{}/rerank", self.config.url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .json(&RerankRequest { query, texts })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RaglineError::from_response("reranker", response).await);
        }

        let results: Vec<RerankResult> = response.json().await?;
        let results = sort_results(results, texts.len())?;

        tracing::debug!(
            "Reranked {} texts in {} ms",
            texts.len(),
            start.elapsed().as_millis()
        );
        Ok(results)
    }

    fn model_name(&self) -> &str {
        &self.config.url
    }
}

/// Validate indices and order by descending score
fn sort_results(mut results: Vec<RerankResult>, text_count: usize) -> Result<Vec<RerankResult>> {
    if let Some(bad) = results.iter().find(|r| r.index >= text_count) {
        return Err(RaglineError::Llm(format!(
            "Reranker returned index {} for {} texts",
            bad.index, text_count
        )));
    }
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(results)
}
