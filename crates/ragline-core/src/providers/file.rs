//! Local file loader
//!
//! Loads a single file, or walks a directory for text, markdown and HTML files.

use super::html::{extract_title, html_to_text};
use super::{SourceLoader, TextFilter};
use crate::error::{RaglineError, Result};
use crate::index::DocumentRecord;
use async_trait::async_trait;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// File extensions picked up when walking a directory
const EXTENSIONS: &[&str] = &["txt", "md", "markdown", "html", "htm"];

/// Directories to exclude from scanning
const EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", "target", "__pycache__", ".venv"];

/// Loader for local files and directories
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    /// Applied to HTML files only; text and markdown are kept verbatim
    filter: TextFilter,
}

impl FileLoader {
    pub fn new(filter: TextFilter) -> Self {
        Self { filter }
    }

    fn load_path(&self, path: &Path) -> Result<Vec<DocumentRecord>> {
        if path.is_file() {
            return Ok(vec![self.load_file(path)?]);
        }
        if !path.is_dir() {
            return Err(RaglineError::Source(format!(
                "No such file or directory: {}",
                path.display()
            )));
        }

        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !should_skip(e));

        let mut docs = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !has_supported_extension(entry.path()) {
                continue;
            }
            match self.load_file(entry.path()) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }
        Ok(docs)
    }

    fn load_file(&self, path: &Path) -> Result<DocumentRecord> {
        let content = std::fs::read_to_string(path)?;
        let source = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.clone());

        if is_html(path) {
            let description = extract_title(&content).unwrap_or(file_name);
            let text = self.filter.apply(&html_to_text(&content));
            return Ok(DocumentRecord::new(source, text, description));
        }

        let description = markdown_heading(&content).unwrap_or(file_name);
        Ok(DocumentRecord::new(source, content, description))
    }
}

#[async_trait]
impl SourceLoader for FileLoader {
    fn loader_type(&self) -> &'static str {
        "file"
    }

    async fn load(&self, source: &str) -> Result<Vec<DocumentRecord>> {
        let path = Path::new(source).to_path_buf();
        let loader = self.clone();
        tokio::task::spawn_blocking(move || loader.load_path(&path))
            .await
            .map_err(|e| RaglineError::Source(format!("File loading task failed: {}", e)))?
    }
}

fn markdown_heading(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| line.trim_start().starts_with("# "))
        .map(|line| line.trim_start().trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn has_supported_extension(path: &Path) -> bool {
    EXTENSIONS.contains(&extension(path).as_str())
}

fn is_html(path: &Path) -> bool {
    matches!(extension(path).as_str(), "html" | "htm")
}

fn should_skip(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0
        && (name.starts_with('.') || (entry.file_type().is_dir() && EXCLUDE_DIRS.contains(&&*name)))
}
