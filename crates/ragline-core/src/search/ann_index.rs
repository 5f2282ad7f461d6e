//! HNSW approximate nearest neighbor index for inner-product search

use crate::config::VectorStoreConfig;
use crate::db::vectors::{inner_product, RecordGeneration};
use instant_distance::{Builder, HnswMap, Search};

const BUILD_SEED: u64 = 0x5eed;

/// Wrapper for f32 vectors implementing instant_distance::Point
#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Larger inner product means closer
        1.0 - inner_product(&self.values, &other.values)
    }
}

/// HNSW-backed approximate nearest neighbor index over record ids
pub struct AnnIndex {
    index: Option<HnswMap<EmbeddingPoint, i64>>,
    embedding_count: usize,
    ef_search: usize,
    generation: RecordGeneration,
}

impl AnnIndex {
    /// Build an index from (record id, embedding) pairs.
    /// Skips building if there are fewer than `ann_threshold` embeddings.
    pub fn build(embeddings: Vec<(i64, Vec<f32>)>, config: &VectorStoreConfig) -> Self {
        let count = embeddings.len();
        let generation = RecordGeneration::of(&embeddings);
        if count == 0 || count < config.ann_threshold {
            tracing::debug!(
                "Skipping ANN index build: {} embeddings < {} threshold",
                count,
                config.ann_threshold
            );
            return Self {
                index: None,
                embedding_count: count,
                ef_search: config.ef_search,
                generation,
            };
        }

        let (points, keys): (Vec<EmbeddingPoint>, Vec<i64>) = embeddings
            .into_iter()
            .map(|(id, values)| (EmbeddingPoint { values }, id))
            .unzip();

        let map = Builder::default()
            .ef_construction(config.ef_construction)
            .ef_search(config.ef_search)
            .seed(BUILD_SEED)
            .build(points, keys);

        tracing::info!("Built ANN index with {} embeddings", count);
        Self {
            index: Some(map),
            embedding_count: count,
            ef_search: config.ef_search,
            generation,
        }
    }

    /// Search for up to k nearest records.
    /// Returns (record id, inner product) pairs, best first; empty if not built.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(i64, f32)> {
        let map = match self.index.as_ref() {
            Some(m) => m,
            None => return vec![],
        };

        let query_point = EmbeddingPoint {
            values: query.to_vec(),
        };
        let mut search = Search::default();

        map.search(&query_point, &mut search)
            .take(k)
            .map(|item| (*item.value, 1.0 - item.distance))
            .collect()
    }

    /// Whether the HNSW graph has been built
    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// Largest k a single search can serve
    pub fn capacity(&self) -> usize {
        self.ef_search
    }

    /// Records the index was built from
    pub fn generation(&self) -> RecordGeneration {
        self.generation
    }

    /// Number of embeddings seen at build time (even if the graph wasn't built)
    pub fn len(&self) -> usize {
        self.embedding_count
    }

    pub fn is_empty(&self) -> bool {
        self.embedding_count == 0
    }
}
