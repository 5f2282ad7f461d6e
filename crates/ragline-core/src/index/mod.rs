//! Indexing pipeline
//!
//! Segmentation, batched embedding and collection building.

mod chunker;
mod embedder;
mod ingest;

pub use chunker::*;
pub use embedder::*;
pub use ingest::*;
