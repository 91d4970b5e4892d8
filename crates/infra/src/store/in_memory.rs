use std::collections::HashMap;
use std::sync::RwLock;

use super::r#trait::{Collection, CollectionWrite, DataStore, Snapshot, StoreError, check_commit};

/// In-memory collection store.
///
/// Intended for tests/dev; contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, Snapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn load(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<Vec<u64>, StoreError> {
        if writes.is_empty() {
            return Ok(vec![]);
        }

        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;

        check_commit(&writes, |c| collections.get(&c).map(|s| s.version).unwrap_or(0))?;

        let mut versions = Vec::with_capacity(writes.len());
        for w in writes {
            let slot = collections.entry(w.collection).or_default();
            slot.version += 1;
            slot.records = w.records;
            versions.push(slot.version);
        }

        tracing::debug!(?versions, "in-memory store commit");
        Ok(versions)
    }
}
