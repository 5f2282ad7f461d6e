//! Record storage
//!
//! Embeddings are stored as little-endian f32 BLOBs; similarity is the
//! inner product, computed in Rust.

use super::{Database, NewRecord};
use crate::error::{RaglineError, Result};
use chrono::Utc;
use rusqlite::params;
use std::collections::HashMap;

/// Snapshot of a collection's records, used to detect indexes built from
/// records that have since been replaced by another handle on the store.
/// Record ids are never reused, so any rebuild changes `max_id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordGeneration {
    pub count: usize,
    pub max_id: Option<i64>,
}

impl RecordGeneration {
    pub fn of(embeddings: &[(i64, Vec<f32>)]) -> Self {
        Self {
            count: embeddings.len(),
            max_id: embeddings.iter().map(|(id, _)| *id).max(),
        }
    }
}

impl Database {
    /// Bulk insert records into a collection.
    ///
    /// A missing collection is reported and nothing is inserted. Every
    /// embedding must match the collection's dimension.
    pub fn insert_records(&self, collection: &str, records: &[NewRecord]) -> Result<usize> {
        let dims = match self.collection_dimensions(collection)? {
            Some(d) => d,
            None => {
                tracing::error!("Cannot insert into missing collection '{}'", collection);
                return Ok(0);
            }
        };

        if let Some(bad) = records.iter().find(|r| r.embedding.len() != dims) {
            return Err(RaglineError::DimensionMismatch {
                collection: collection.to_string(),
                expected: dims,
                actual: bad.embedding.len(),
            });
        }

        let now = Utc::now().timestamp();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection, embedding, text, text_length, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    collection,
                    embedding_to_bytes(&record.embedding),
                    record.text,
                    record.text.chars().count() as i64,
                    now
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Inserted {} records into '{}'", records.len(), collection);
        Ok(records.len())
    }

    /// Number of records in a collection
    pub fn count_records(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Current record generation of a collection
    pub fn record_generation(&self, collection: &str) -> Result<RecordGeneration> {
        let (count, max_id): (i64, Option<i64>) = self.conn()?.query_row(
            "SELECT COUNT(*), MAX(id) FROM records WHERE collection = ?1",
            params![collection],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(RecordGeneration {
            count: count as usize,
            max_id,
        })
    }

    /// All (id, embedding) pairs of a collection, in insertion order
    pub fn get_embeddings_for_collection(&self, collection: &str) -> Result<Vec<(i64, Vec<f32>)>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, embedding FROM records WHERE collection = ?1 ORDER BY id")?;
        let results = stmt
            .query_map(params![collection], |row| {
                let id: i64 = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((id, bytes_to_embedding(&bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Text and text length for the given record ids
    pub(crate) fn get_record_texts(
        &self,
        collection: &str,
        ids: &[i64],
    ) -> Result<HashMap<i64, (String, usize)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT text, text_length FROM records WHERE id = ?1 AND collection = ?2",
        )?;
        let mut out = HashMap::with_capacity(ids.len());
        for &id in ids {
            let mut rows = stmt.query(params![id, collection])?;
            if let Some(row) = rows.next()? {
                let text: String = row.get(0)?;
                let len: i64 = row.get(1)?;
                out.insert(id, (text, len as usize));
            }
        }
        Ok(out)
    }
}

/// Convert f32 embedding to bytes
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Inner product of two embeddings; 0.0 when dimensions differ
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
