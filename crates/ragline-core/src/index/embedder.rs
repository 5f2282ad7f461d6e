//! Batched embedding with order preservation

use crate::config::EmbeddingServiceConfig;
use crate::error::{RaglineError, Result};
use crate::llm::Embedder;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Embedding client that batches requests to an [`Embedder`].
///
/// Output position `i` always corresponds to input position `i`, whatever the
/// batch size or concurrency. Any failing batch fails the whole call.
#[derive(Clone)]
pub struct EmbeddingClient {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    max_concurrent: usize,
}

impl EmbeddingClient {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize, max_concurrent: usize) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn from_config(embedder: Arc<dyn Embedder>, config: &EmbeddingServiceConfig) -> Self {
        Self::new(embedder, config.batch_size, config.max_concurrent)
    }

    /// Output dimension D of the underlying embedder
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    /// Embed document texts in fixed-size batches
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let batches: Vec<&[String]> = texts.chunks(self.batch_size).collect();
        let total_batches = batches.len();

        tracing::info!(
            "Embedding {} texts with {} in {} batches ({} concurrent)",
            texts.len(),
            self.embedder.model_name(),
            total_batches,
            self.max_concurrent
        );

        let mut results: Vec<(usize, Vec<Vec<f32>>)> = stream::iter(batches)
            .enumerate()
            .map(|(idx, batch)| async move {
                tracing::debug!("Processing batch {}/{}", idx + 1, total_batches);
                let embeddings = self.embedder.embed_batch(batch).await?;
                if embeddings.len() != batch.len() {
                    return Err(RaglineError::Llm(format!(
                        "Batch {} returned {} embeddings for {} texts",
                        idx + 1,
                        embeddings.len(),
                        batch.len()
                    )));
                }
                Ok((idx, embeddings))
            })
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await?;

        results.sort_by_key(|(idx, _)| *idx);
        let embeddings: Vec<Vec<f32>> = results.into_iter().flat_map(|(_, e)| e).collect();

        tracing::debug!(
            "Embedded {} texts in {} ms",
            embeddings.len(),
            start.elapsed().as_millis()
        );
        Ok(embeddings)
    }

    /// Embed a single query text
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).await
    }
}
