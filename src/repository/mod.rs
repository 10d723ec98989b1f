//! Record storage.
//!
//! [`Repository`] is the only way application code reaches stored records.
//! [`InMemoryRepository`] backs tests and demos; the SQLite repository in
//! [`sqlite`] is the persistent implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::filter::RecordFilter;
use crate::records::Record;

#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Storage for one kind of record.
///
/// Implementations serialize writes to the same record; concurrent upserts
/// of one id resolve last-writer-wins.
pub trait Repository<R: Record>: Send + Sync {
    /// Fetch a record by id.
    fn get(&self, id: Uuid) -> Result<Option<R>>;

    /// All records, ordered by name then id.
    fn list(&self) -> Result<Vec<R>>;

    /// Insert a record or replace the stored record with the same id.
    fn upsert(&self, record: R) -> Result<()>;

    /// Delete a record. Returns whether a record was removed.
    fn delete(&self, id: Uuid) -> Result<bool>;

    /// Records passing a filter, in [`Repository::list`] order.
    fn search(&self, filter: &RecordFilter) -> Result<Vec<R>> {
        Ok(filter.retain(self.list()?))
    }
}

pub(crate) fn sort_records<R: Record>(records: &mut [R]) {
    records.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
}

/// Repository holding records in process memory.
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    records: RwLock<BTreeMap<Uuid, R>>,
}

impl<R: Record> InMemoryRepository<R> {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a repository pre-filled with records.
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id(), r)).collect()),
        }
    }

    /// Number of stored records.
    ///
    /// A poisoned lock still reports the records it holds.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .map_or_else(|e| e.into_inner().len(), |m| m.len())
    }

    /// Whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Record> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::storage_error("in-memory repository lock poisoned")
}

impl<R: Record> Repository<R> for InMemoryRepository<R> {
    fn get(&self, id: Uuid) -> Result<Option<R>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<R>> {
        let mut out: Vec<R> = self.records.read().map_err(poisoned)?.values().cloned().collect();
        sort_records(&mut out);
        Ok(out)
    }

    fn upsert(&self, record: R) -> Result<()> {
        let id = record.id();
        let replaced = self
            .records
            .write()
            .map_err(poisoned)?
            .insert(id, record)
            .is_some();
        tracing::debug!(kind = R::KIND, %id, replaced, "upserted record");
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = self.records.write().map_err(poisoned)?.remove(&id).is_some();
        tracing::debug!(kind = R::KIND, %id, removed, "deleted record");
        Ok(removed)
    }
}
