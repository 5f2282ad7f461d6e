//! Per-collection read/write serialization
//!
//! Ingestion replaces a collection wholesale, so it takes the collection's
//! write lock; queries take the read lock while retrieving from it. Locks
//! are keyed by collection name and shared by every clone of the registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Named read/write locks, one per collection
#[derive(Clone, Default)]
pub struct CollectionLocks {
    locks: Arc<Mutex<HashMap<String, Arc<RwLock<()>>>>>,
}

impl CollectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, collection: &str) -> Arc<RwLock<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Shared access for queries
    pub async fn read(&self, collection: &str) -> OwnedRwLockReadGuard<()> {
        self.lock_for(collection).read_owned().await
    }

    /// Exclusive access for ingestion
    pub async fn write(&self, collection: &str) -> OwnedRwLockWriteGuard<()> {
        self.lock_for(collection).write_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_readers_share() {
        let locks = CollectionLocks::new();
        let _a = locks.read("docs").await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.read("docs")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_writer_excludes_readers() {
        let locks = CollectionLocks::new();
        let guard = locks.write("docs").await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.read("docs")).await;
        assert!(blocked.is_err());

        let other = tokio::time::timeout(Duration::from_millis(50), locks.read("other")).await;
        assert!(other.is_ok());

        drop(guard);
        let clone = locks.clone();
        let after = tokio::time::timeout(Duration::from_millis(50), clone.write("docs")).await;
        assert!(after.is_ok());
    }
}
