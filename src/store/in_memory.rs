//! InMemoryRecordStore - HashMap-backed record store for tests, demos and embedding.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::{RecordStore, StoreError};
use crate::record::{Record, Versioned};

/// Internal stored representation of a record.
struct StoredRecord {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory record store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`, payloads are bitcode-encoded. The
/// version comparison and the write happen under one write lock, which is
/// what makes `conditional_update` a true compare-and-swap. Clone-friendly
/// via Arc: clones share the same storage.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    storage: Arc<RwLock<HashMap<String, StoredRecord>>>,
}

impl fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `None` when the lock is poisoned or held by a writer.
        let records = self.storage.try_read().ok().map(|storage| storage.len());
        f.debug_struct("InMemoryRecordStore")
            .field("records", &records)
            .finish()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create a new empty record store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    /// Insert a new record at version 1. Fails if it already exists.
    pub fn insert<R: Record>(&self, record: &R) -> Result<Versioned<R>, StoreError> {
        let key = Self::make_key(R::COLLECTION, record.id());
        let bytes = bitcode::serialize(record)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Poisoned("insert".into()))?;

        if let Some(existing) = storage.get(&key) {
            return Err(StoreError::Rejected(format!(
                "{} already exists at version {}",
                key, existing.version
            )));
        }

        storage.insert(key, StoredRecord { bytes, version: 1 });

        Ok(Versioned {
            data: record.clone(),
            version: 1,
        })
    }

    /// Delete a record by id. Returns true if it existed.
    pub fn delete<R: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let key = Self::make_key(R::COLLECTION, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Poisoned("delete".into()))?;

        Ok(storage.remove(&key).is_some())
    }

    /// Number of records across all collections.
    pub fn len(&self) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Poisoned("len".into()))?;
        Ok(storage.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch<R: Record>(&self, id: &str) -> Result<Option<Versioned<R>>, StoreError> {
        let key = Self::make_key(R::COLLECTION, id);
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Poisoned("fetch".into()))?;

        match storage.get(&key) {
            Some(stored) => {
                let data: R = bitcode::deserialize(&stored.bytes)?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn conditional_update<R: Record>(
        &self,
        id: &str,
        expected_version: u64,
        attributes: &R,
        new_version: u64,
    ) -> Result<bool, StoreError> {
        let key = Self::make_key(R::COLLECTION, id);
        let bytes = bitcode::serialize(attributes)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Poisoned("conditional update".into()))?;

        match storage.get_mut(&key) {
            Some(stored) if stored.version == expected_version => {
                stored.bytes = bytes;
                stored.version = new_version;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
