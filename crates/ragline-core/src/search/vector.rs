//! Vector similarity search
//!
//! Exact inner-product scan for small or not-yet-indexed collections, the
//! HNSW index otherwise. Results are deduplicated by exact text so repeated
//! chunks cannot crowd out other evidence.

use super::AnnIndex;
use crate::db::vectors::inner_product;
use crate::db::{Database, SearchHit, VectorStore};
use crate::error::{RaglineError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

impl Database {
    /// Build (or rebuild) the ANN index for a collection from its records
    pub fn ensure_indexed(&self, collection: &str) -> Result<()> {
        if !self.has_collection(collection)? {
            return Err(RaglineError::CollectionNotFound(collection.to_string()));
        }

        let start = Instant::now();
        let embeddings = self.get_embeddings_for_collection(collection)?;
        let index = AnnIndex::build(embeddings, &self.config);
        self.indexes
            .write()
            .map_err(|e| RaglineError::Search(format!("Index map lock poisoned: {}", e)))?
            .insert(collection.to_string(), Arc::new(index));

        tracing::debug!(
            "Indexed collection '{}' in {} ms",
            collection,
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Build indexes for every existing collection (process start)
    pub fn load_indexes(&self) -> Result<usize> {
        let collections = self.list_collections()?;
        for info in &collections {
            self.ensure_indexed(&info.name)?;
        }
        Ok(collections.len())
    }

    pub(crate) fn forget_index(&self, collection: &str) -> Result<()> {
        self.indexes
            .write()
            .map_err(|e| RaglineError::Search(format!("Index map lock poisoned: {}", e)))?
            .remove(collection);
        Ok(())
    }

    fn index_for(&self, collection: &str) -> Option<Arc<AnnIndex>> {
        self.indexes.read().ok()?.get(collection).cloned()
    }

    /// Top-k records by inner product, best first, without duplicate texts
    pub fn search_collection(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let dims = self
            .collection_dimensions(collection)?
            .ok_or_else(|| RaglineError::CollectionNotFound(collection.to_string()))?;
        if query.len() != dims {
            return Err(RaglineError::DimensionMismatch {
                collection: collection.to_string(),
                expected: dims,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let fetch = k * self.config.over_fetch.max(1);
        let candidates = match self.current_index(collection, fetch)? {
            Some(index) => index.search(query, fetch),
            None => self.exact_candidates(collection, query, fetch)?,
        };

        let ids: Vec<i64> = candidates.iter().map(|(id, _)| *id).collect();
        let mut texts = self.get_record_texts(collection, &ids)?;

        let hits = candidates
            .into_iter()
            .filter_map(|(id, similarity)| {
                texts.remove(&id).map(|(text, text_length)| SearchHit {
                    id,
                    text,
                    similarity,
                    text_length,
                })
            })
            .collect();

        Ok(dedup_by_text(hits, k))
    }

    /// The collection's ANN index, if it can serve `fetch` results and was
    /// built from the records currently in the store
    fn current_index(&self, collection: &str, fetch: usize) -> Result<Option<Arc<AnnIndex>>> {
        let index = match self.index_for(collection) {
            Some(index) if index.is_built() && fetch <= index.capacity() => index,
            _ => return Ok(None),
        };

        if index.generation() != self.record_generation(collection)? {
            tracing::warn!(
                "Collection '{}' changed since it was indexed, searching exactly",
                collection
            );
            self.forget_index(collection)?;
            return Ok(None);
        }
        Ok(Some(index))
    }

    fn exact_candidates(
        &self,
        collection: &str,
        query: &[f32],
        fetch: usize,
    ) -> Result<Vec<(i64, f32)>> {
        let mut scored: Vec<(i64, f32)> = self
            .get_embeddings_for_collection(collection)?
            .iter()
            .map(|(id, embedding)| (*id, inner_product(query, embedding)))
            .collect();

        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(fetch);
        Ok(scored)
    }
}

/// Keep the first occurrence of each distinct text, up to `k` hits
pub fn dedup_by_text(hits: Vec<SearchHit>, k: usize) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.text.clone()))
        .take(k)
        .collect()
}

/// Retrieve candidates for a query, degrading to no results on failure.
///
/// A missing collection or a search error is logged and yields an empty
/// list so the request proceeds ungrounded.
pub fn retrieve(
    store: &dyn VectorStore,
    collection: &str,
    query: &[f32],
    k: usize,
) -> Vec<SearchHit> {
    let start = Instant::now();
    let hits = match store.search(collection, query, k) {
        Ok(hits) => hits,
        Err(RaglineError::CollectionNotFound(name)) => {
            tracing::warn!("Collection '{}' not found, answering without context", name);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Search in '{}' failed: {}", collection, e);
            Vec::new()
        }
    };

    tracing::debug!(
        "Retrieved {} candidates from '{}' in {} ms",
        hits.len(),
        collection,
        start.elapsed().as_millis()
    );
    hits
}
