//! Source loaders
//!
//! Turn ingestion sources (web pages, local files and directories) into
//! [`DocumentRecord`]s for the segmenter. The [`SourceRegistry`] dispatches
//! `http(s)://` sources to [`URLLoader`] and everything else to [`FileLoader`].

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::index::DocumentRecord;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

pub mod file;
pub mod filter;
pub mod html;
pub mod url;

pub use file::FileLoader;
pub use filter::TextFilter;
pub use url::URLLoader;

/// Source loader trait - every ingestion source type implements this
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Loader type identifier (e.g., "file", "url")
    fn loader_type(&self) -> &'static str;

    /// Load every document a source refers to (a directory yields several)
    async fn load(&self, source: &str) -> Result<Vec<DocumentRecord>>;
}

/// Documents loaded from a source list, plus the sources that yielded nothing
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub documents: Vec<DocumentRecord>,
    pub skipped: Vec<String>,
}

/// Load sources in input order.
///
/// Repeated sources are loaded once. A source that fails or produces only
/// empty documents is skipped with a warning rather than failing the batch.
pub async fn load_all(loader: &dyn SourceLoader, sources: &[String]) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    let mut seen = HashSet::new();

    for source in sources {
        let source = source.trim();
        if source.is_empty() || !seen.insert(source.to_string()) {
            continue;
        }

        match loader.load(source).await {
            Ok(docs) => {
                let before = outcome.documents.len();
                outcome
                    .documents
                    .extend(docs.into_iter().filter(|d| !d.text.trim().is_empty()));
                if outcome.documents.len() == before {
                    tracing::warn!("Source produced no text, skipping: {}", source);
                    outcome.skipped.push(source.to_string());
                } else {
                    tracing::info!(
                        "Loaded {} document(s) from {}",
                        outcome.documents.len() - before,
                        source
                    );
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", source, e);
                outcome.skipped.push(source.to_string());
            }
        }
    }

    outcome
}

/// Registry dispatching sources to the right loader
pub struct SourceRegistry {
    url: Arc<dyn SourceLoader>,
    file: Arc<dyn SourceLoader>,
}

impl SourceRegistry {
    pub fn new(url: Arc<dyn SourceLoader>, file: Arc<dyn SourceLoader>) -> Self {
        Self { url, file }
    }

    /// Registry with the HTTP and filesystem loaders
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        let filter = TextFilter::from_config(config);
        Ok(Self::new(
            Arc::new(URLLoader::new(config.timeout_secs, filter.clone())?),
            Arc::new(FileLoader::new(filter)),
        ))
    }

    /// Loader responsible for `source`
    pub fn loader_for(&self, source: &str) -> &Arc<dyn SourceLoader> {
        if is_url(source) {
            &self.url
        } else {
            &self.file
        }
    }
}

#[async_trait]
impl SourceLoader for SourceRegistry {
    fn loader_type(&self) -> &'static str {
        "registry"
    }

    async fn load(&self, source: &str) -> Result<Vec<DocumentRecord>> {
        self.loader_for(source).load(source).await
    }
}

fn is_url(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
