//! Collection operations

use super::Database;
use crate::error::{RaglineError, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

/// Similarity metric recorded for every collection (inner product)
pub const METRIC_INNER_PRODUCT: &str = "ip";

/// Collection info
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimensions: usize,
    pub metric: String,
    pub record_count: usize,
    pub created_at: String,
}

impl Database {
    /// Check whether a collection exists
    pub fn has_collection(&self, name: &str) -> Result<bool> {
        Ok(self.collection_dimensions(name)?.is_some())
    }

    /// Embedding dimension of a collection, if it exists
    pub fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        let dims: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT dimensions FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dims.map(|d| d as usize))
    }

    /// Create an empty collection with fixed embedding dimension
    pub fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RaglineError::InvalidInput(
                "Collection name must not be empty".to_string(),
            ));
        }
        if dimensions == 0 {
            return Err(RaglineError::InvalidInput(
                "Collection dimensions must be positive".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let inserted = self.conn()?.execute(
            "INSERT OR IGNORE INTO collections (name, dimensions, metric, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, dimensions as i64, METRIC_INNER_PRODUCT, now],
        )?;
        if inserted == 0 {
            return Err(RaglineError::InvalidInput(format!(
                "Collection '{}' already exists",
                name
            )));
        }

        tracing::info!("Created collection '{}' ({} dimensions)", name, dimensions);
        Ok(())
    }

    /// Drop a collection and all its records. Returns whether it existed.
    pub fn drop_collection(&self, name: &str) -> Result<bool> {
        let removed = {
            let conn = self.conn()?;
            conn.execute("DELETE FROM records WHERE collection = ?1", params![name])?;
            conn.execute("DELETE FROM collections WHERE name = ?1", params![name])?
        };
        self.forget_index(name)?;

        if removed > 0 {
            tracing::info!("Dropped collection '{}'", name);
        }
        Ok(removed > 0)
    }

    /// Get collection details
    pub fn get_collection(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let info = self
            .conn()?
            .query_row(
                "SELECT c.name, c.dimensions, c.metric, c.created_at,
                        (SELECT COUNT(*) FROM records r WHERE r.collection = c.name)
                 FROM collections c WHERE c.name = ?1",
                params![name],
                row_to_info,
            )
            .optional()?;
        Ok(info)
    }

    /// List all collections, ordered by name
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.name, c.dimensions, c.metric, c.created_at,
                    (SELECT COUNT(*) FROM records r WHERE r.collection = c.name)
             FROM collections c ORDER BY c.name",
        )?;
        let results = stmt
            .query_map([], row_to_info)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }
}

fn row_to_info(row: &rusqlite::Row<'_>) -> rusqlite::Result<CollectionInfo> {
    Ok(CollectionInfo {
        name: row.get(0)?,
        dimensions: row.get::<_, i64>(1)? as usize,
        metric: row.get(2)?,
        created_at: row.get(3)?,
        record_count: row.get::<_, i64>(4)? as usize,
    })
}
