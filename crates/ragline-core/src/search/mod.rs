//! Retrieval
//!
//! Approximate and exact inner-product search over collections, followed by
//! cross-encoder reranking and strict relevance filtering.

mod ann_index;
pub mod rerank;
pub mod vector;

pub use ann_index::AnnIndex;
pub use rerank::{filter, rerank, ScoredChunk};
pub use vector::{dedup_by_text, retrieve};
