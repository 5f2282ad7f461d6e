//! Service wiring
//!
//! Clients are constructed once per process from the loaded config and
//! handed to the pipelines.

use anyhow::{Context, Result};
use ragline_core::{
    CollectionLocks, Config, Database, EmbeddingClient, HttpEmbedder, HttpReranker,
    IngestionPipeline, QueryPipeline, Segmenter, SourceRegistry, VLLMClient,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Services {
    pub config: Config,
    pub db: Arc<Database>,
    locks: CollectionLocks,
}

impl Services {
    /// Load config and open the vector store
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::load()?,
        };

        // Use RAGLINE_DB env var if set, otherwise the default cache location
        let db_path = std::env::var("RAGLINE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Database::default_path());
        let db = Database::open(&db_path)?.with_config(config.vector_store.clone());
        db.initialize()?;
        tracing::debug!("Opened vector store {}", db_path.display());

        Ok(Self {
            config,
            db: Arc::new(db),
            locks: CollectionLocks::new(),
        })
    }

    fn embeddings(&self) -> Result<EmbeddingClient> {
        let embedder = HttpEmbedder::new(self.config.embedding.clone())?;
        Ok(EmbeddingClient::from_config(
            Arc::new(embedder),
            &self.config.embedding,
        ))
    }

    /// Query pipeline over warmed collection indexes
    pub fn query_pipeline(&self) -> Result<QueryPipeline> {
        let loaded = self.db.load_indexes()?;
        tracing::debug!("Loaded {} collection indexes", loaded);

        let llm = Arc::new(VLLMClient::new(self.config.llm_service.clone())?);
        let reranker = HttpReranker::new(self.config.reranker.clone())?;
        Ok(QueryPipeline::new(
            llm.clone(),
            llm,
            self.embeddings()?,
            Arc::new(reranker),
            self.db.clone(),
            self.locks.clone(),
            &self.config,
        ))
    }

    pub fn ingestion_pipeline(&self) -> Result<IngestionPipeline> {
        let loader = SourceRegistry::from_config(&self.config.loader)?;
        let segmenter = Segmenter::from_config(&self.config.chunking)?;
        Ok(IngestionPipeline::new(
            Arc::new(loader),
            segmenter,
            self.embeddings()?,
            self.db.clone(),
            self.locks.clone(),
        ))
    }
}
