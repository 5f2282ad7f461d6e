//! Ingestion orchestrator
//!
//! load → segment → embed → drop → create → insert → index.
//! Ingestion is destructive-replace: the target collection is rebuilt from
//! the given sources alone. The old collection is dropped only after every
//! chunk has been embedded, so a failing embedding service leaves it intact.

use super::{DocumentRecord, EmbeddingClient, Segmenter};
use crate::db::{NewRecord, VectorStore};
use crate::error::{RaglineError, Result};
use crate::locks::CollectionLocks;
use crate::providers::{load_all, SourceLoader};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Ingestion statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestStats {
    pub documents: usize,
    pub skipped_sources: Vec<String>,
    pub chunks: usize,
    pub inserted: usize,
}

/// Builds searchable collections from sources
pub struct IngestionPipeline {
    loader: Arc<dyn SourceLoader>,
    segmenter: Segmenter,
    embeddings: EmbeddingClient,
    store: Arc<dyn VectorStore>,
    locks: CollectionLocks,
}

impl IngestionPipeline {
    pub fn new(
        loader: Arc<dyn SourceLoader>,
        segmenter: Segmenter,
        embeddings: EmbeddingClient,
        store: Arc<dyn VectorStore>,
        locks: CollectionLocks,
    ) -> Self {
        Self {
            loader,
            segmenter,
            embeddings,
            store,
            locks,
        }
    }

    /// Load `sources` and rebuild `collection` from them
    pub async fn ingest(&self, sources: &[String], collection: &str) -> Result<IngestStats> {
        validate_collection_name(collection)?;
        let _guard = self.locks.write(collection).await;

        let start = Instant::now();
        let outcome = load_all(self.loader.as_ref(), sources).await;
        tracing::debug!("Loaded sources in {} ms", start.elapsed().as_millis());

        if outcome.documents.is_empty() {
            return Err(RaglineError::InvalidInput(format!(
                "None of the {} source(s) produced any text",
                sources.len()
            )));
        }

        let mut stats = self.rebuild(&outcome.documents, collection).await?;
        stats.skipped_sources = outcome.skipped;
        Ok(stats)
    }

    /// Rebuild `collection` from already loaded documents
    pub async fn ingest_documents(
        &self,
        documents: &[DocumentRecord],
        collection: &str,
    ) -> Result<IngestStats> {
        validate_collection_name(collection)?;
        let _guard = self.locks.write(collection).await;

        if documents.is_empty() {
            return Err(RaglineError::InvalidInput(
                "No documents to ingest".to_string(),
            ));
        }
        self.rebuild(documents, collection).await
    }

    /// Caller holds the collection's write lock
    async fn rebuild(&self, documents: &[DocumentRecord], collection: &str) -> Result<IngestStats> {
        let start = Instant::now();
        let chunks = self.segmenter.segment(documents);
        tracing::debug!(
            "Segmented {} documents into {} chunks in {} ms",
            documents.len(),
            chunks.len(),
            start.elapsed().as_millis()
        );
        if chunks.is_empty() {
            return Err(RaglineError::InvalidInput(
                "Documents produced no chunks".to_string(),
            ));
        }

        let texts: Vec<String> = chunks.into_iter().map(|c| c.text).collect();
        let embeddings = self.embeddings.embed_documents(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RaglineError::Index(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                texts.len()
            )));
        }

        let start = Instant::now();
        if self.store.drop_collection(collection)? {
            tracing::info!("Replacing existing collection '{}'", collection);
        }
        self.store
            .create_collection(collection, self.embeddings.dimensions())?;

        let records: Vec<NewRecord> = embeddings
            .into_iter()
            .zip(texts)
            .map(|(embedding, text)| NewRecord::new(embedding, text))
            .collect();
        let inserted = self.store.insert_records(collection, &records)?;
        if inserted != records.len() {
            return Err(RaglineError::Index(format!(
                "Inserted {} of {} records into '{}'",
                inserted,
                records.len(),
                collection
            )));
        }

        self.store.ensure_indexed(collection)?;
        tracing::debug!("Stored collection in {} ms", start.elapsed().as_millis());
        tracing::info!(
            "Ingested {} documents as {} records into '{}'",
            documents.len(),
            inserted,
            collection
        );

        Ok(IngestStats {
            documents: documents.len(),
            skipped_sources: Vec::new(),
            chunks: records.len(),
            inserted,
        })
    }
}

fn validate_collection_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RaglineError::InvalidInput(
            "Collection name must not be empty".to_string(),
        ));
    }
    Ok(())
}
