//! Record stores - the persistence seam of the mutation engine.
//!
//! The engine needs exactly two things from a store: a point read and an
//! atomic compare-and-swap on the record version. Anything that offers a
//! conditional write on a field (a document database `updateOne` filtered on
//! `version`, a SQL `UPDATE ... WHERE version = ?`, a KV store CAS) can
//! implement [`RecordStore`].

mod error;
mod in_memory;

use std::sync::Arc;

use crate::record::{Record, Versioned};

pub use error::StoreError;
pub use in_memory::InMemoryRecordStore;

/// Abstract keyed storage with version-checked writes.
pub trait RecordStore: Send + Sync {
    /// Get a record by id. Returns `None` if it does not exist.
    fn fetch<R: Record>(&self, id: &str) -> Result<Option<Versioned<R>>, StoreError>;

    /// Atomically replace the record stored under `id` with `attributes` at
    /// `new_version`, but only if its stored version still equals
    /// `expected_version`.
    ///
    /// Returns `Ok(true)` when the write was applied. Returns `Ok(false)` when
    /// the stored version differs (or the record is gone); the stored record
    /// must then be left exactly as it was.
    fn conditional_update<R: Record>(
        &self,
        id: &str,
        expected_version: u64,
        attributes: &R,
        new_version: u64,
    ) -> Result<bool, StoreError>;
}

impl<S: RecordStore> RecordStore for Arc<S> {
    fn fetch<R: Record>(&self, id: &str) -> Result<Option<Versioned<R>>, StoreError> {
        (**self).fetch(id)
    }

    fn conditional_update<R: Record>(
        &self,
        id: &str,
        expected_version: u64,
        attributes: &R,
        new_version: u64,
    ) -> Result<bool, StoreError> {
        (**self).conditional_update(id, expected_version, attributes, new_version)
    }
}
