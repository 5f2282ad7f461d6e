//! URL loader for web pages

use super::html::{extract_title, html_to_text, looks_like_html};
use super::{SourceLoader, TextFilter};
use crate::error::{RaglineError, Result};
use crate::index::DocumentRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Loader fetching web pages over HTTP
pub struct URLLoader {
    client: Client,
    filter: TextFilter,
}

impl URLLoader {
    pub fn new(timeout_secs: u64, filter: TextFilter) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ragline/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, filter })
    }

    async fn fetch_url(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RaglineError::Source(format!("Request timeout fetching {}", url))
            } else if e.is_connect() {
                RaglineError::Source(format!("Connection error fetching {}", url))
            } else {
                RaglineError::Source(format!("Failed to fetch URL {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let msg = match status {
                StatusCode::NOT_FOUND => format!("URL not found (404): {}", url),
                StatusCode::TOO_MANY_REQUESTS => {
                    format!("Rate limit exceeded (429): {}", url)
                }
                s => format!(
                    "HTTP error {} ({}): {}",
                    s.as_u16(),
                    s.canonical_reason().unwrap_or("Unknown error"),
                    url
                ),
            };
            return Err(RaglineError::Source(msg));
        }

        response.text().await.map_err(|e| {
            RaglineError::Source(format!("Failed to read response body from {}: {}", url, e))
        })
    }

    /// Turn a fetched body into a filtered document
    fn to_document(&self, url: &str, body: &str) -> DocumentRecord {
        let (text, description) = if looks_like_html(body) {
            (
                html_to_text(body),
                extract_title(body).unwrap_or_else(|| url.to_string()),
            )
        } else {
            (body.to_string(), url.to_string())
        };
        DocumentRecord::new(url, self.filter.apply(&text), description)
    }
}

#[async_trait]
impl SourceLoader for URLLoader {
    fn loader_type(&self) -> &'static str {
        "url"
    }

    async fn load(&self, source: &str) -> Result<Vec<DocumentRecord>> {
        let body = self.fetch_url(source).await?;
        Ok(vec![self.to_document(source, &body)])
    }
}
