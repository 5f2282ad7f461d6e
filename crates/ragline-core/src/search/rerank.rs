//! Second-pass relevance scoring and filtering

use crate::db::SearchHit;
use crate::error::{RaglineError, Result};
use crate::llm::Reranker;
use serde::Serialize;
use std::time::Instant;

/// A retrieved chunk with its cross-encoder relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub text: String,
    /// First-pass inner-product similarity
    pub similarity: f32,
    /// Rerank score against the query
    pub score: f64,
}

/// Score candidates against `query`, best first.
///
/// Candidates with equal scores keep their retrieval order. A failing
/// reranker fails the call; there is no fallback to retrieval order.
pub async fn rerank(
    reranker: &dyn Reranker,
    query: &str,
    candidates: &[SearchHit],
) -> Result<Vec<ScoredChunk>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let results = reranker.rerank(query, &texts).await?;

    let mut scored = Vec::with_capacity(results.len());
    for result in results {
        let hit = candidates.get(result.index).ok_or_else(|| {
            RaglineError::Llm(format!(
                "Reranker returned index {} for {} candidates",
                result.index,
                candidates.len()
            ))
        })?;
        if result.score.is_nan() {
            tracing::warn!("Dropping candidate {} with NaN rerank score", result.index);
            continue;
        }
        scored.push((result.index, hit, result.score));
    }

    scored.sort_by_key(|(index, _, _)| *index);
    scored.dedup_by_key(|(index, _, _)| *index);
    scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    tracing::debug!(
        "Reranked {} candidates with {} in {} ms",
        scored.len(),
        reranker.model_name(),
        start.elapsed().as_millis()
    );

    Ok(scored
        .into_iter()
        .map(|(_, hit, score)| ScoredChunk {
            text: hit.text.clone(),
            similarity: hit.similarity,
            score,
        })
        .collect())
}

/// At most `top_k` chunks scoring strictly above `min_score`, order kept
pub fn filter(scored: &[ScoredChunk], min_score: f64, top_k: usize) -> Vec<ScoredChunk> {
    scored
        .iter()
        .filter(|c| c.score > min_score)
        .take(top_k)
        .cloned()
        .collect()
}
