//! Vector store
//!
//! SQLite-backed named collections of embedded text records with
//! inner-product similarity search.

mod collections;
mod schema;
pub mod vectors;

pub use collections::{CollectionInfo, METRIC_INNER_PRODUCT};
pub use schema::Database;
pub use vectors::RecordGeneration;

use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Record to be inserted; id, length and timestamp are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub embedding: Vec<f32>,
    pub text: String,
}

impl NewRecord {
    pub fn new(embedding: Vec<f32>, text: impl Into<String>) -> Self {
        Self {
            embedding,
            text: text.into(),
        }
    }
}

/// Search hit, ordered by descending similarity in result lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub text: String,
    /// Inner product with the query embedding
    pub similarity: f32,
    pub text_length: usize,
}

/// Vector store operations used by the pipelines
pub trait VectorStore: Send + Sync {
    fn has_collection(&self, name: &str) -> Result<bool>;

    /// Create an empty collection with a fixed embedding dimension
    fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Drop a collection and its records; returns whether it existed
    fn drop_collection(&self, name: &str) -> Result<bool>;

    fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Bulk insert; a missing collection inserts nothing and returns 0
    fn insert_records(&self, name: &str, records: &[NewRecord]) -> Result<usize>;

    /// Build the collection's similarity index from its current records
    fn ensure_indexed(&self, name: &str) -> Result<()>;

    /// Top-k most similar records, deduplicated by exact text
    fn search(&self, name: &str, query: &[f32], k: usize) -> Result<Vec<SearchHit>>;

    fn count_records(&self, name: &str) -> Result<usize>;
}

impl VectorStore for Database {
    fn has_collection(&self, name: &str) -> Result<bool> {
        Database::has_collection(self, name)
    }

    fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        Database::create_collection(self, name, dimensions)
    }

    fn drop_collection(&self, name: &str) -> Result<bool> {
        Database::drop_collection(self, name)
    }

    fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        Database::list_collections(self)
    }

    fn insert_records(&self, name: &str, records: &[NewRecord]) -> Result<usize> {
        Database::insert_records(self, name, records)
    }

    fn ensure_indexed(&self, name: &str) -> Result<()> {
        Database::ensure_indexed(self, name)
    }

    fn search(&self, name: &str, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.search_collection(name, query, k)
    }

    fn count_records(&self, name: &str) -> Result<usize> {
        Database::count_records(self, name)
    }
}

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("vectors.sqlite")
    }
}
