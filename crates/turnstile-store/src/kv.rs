//! The key/value seam and its two implementations.
//!
//! The batch operations are the important part of the contract: a
//! `put_many`/`delete_many` call must apply all of its entries in one
//! transaction, so a credential pair is never observable half-written.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use redb::{Database, TableDefinition};

use crate::StoreError;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

/// Minimal synchronous key/value storage.
pub trait KvStore: Send + Sync + 'static {
    /// Gets the value for a key, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes all entries atomically: either every entry lands or none.
    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<(), StoreError>;

    /// Deletes all keys atomically. Missing keys are not an error.
    fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// Sharing a backend between a store and other observers is common in
/// tests, so any shared `KvStore` is itself a `KvStore`.
impl<K: KvStore> KvStore for std::sync::Arc<K> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<(), StoreError> {
        (**self).put_many(entries)
    }

    fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        (**self).delete_many(keys)
    }
}

// ---------------------------------------------------------------------------
// RedbKv
// ---------------------------------------------------------------------------

/// A [`KvStore`] backed by redb, a pure-Rust embedded key-value database.
///
/// One database file per application instance; the single table holds the
/// credential keys.
pub struct RedbKv {
    db: Database,
}

impl RedbKv {
    /// Opens or creates a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        // Ensure the table exists so first reads don't error.
        let txn = db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let _table = txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Self { db })
    }
}

impl KvStore for RedbKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let table = txn
            .open_table(TABLE)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Storage(e.to_string())),
        }
    }

    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<(), StoreError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            for (key, value) in entries {
                table
                    .insert(*key, *value)
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
            }
        }
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = txn
                .open_table(TABLE)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            for key in keys {
                table
                    .remove(*key)
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
            }
        }
        txn.commit()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryKv
// ---------------------------------------------------------------------------

/// A [`KvStore`] over a `HashMap`, for tests and throwaway sessions that
/// should not touch disk.
#[derive(Default)]
pub struct MemoryKv {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned lock just means another test thread panicked; the map
        // itself is still usable.
        self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn put_many(&self, entries: &[(&str, &[u8])]) -> Result<(), StoreError> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.to_vec());
        }
        Ok(())
    }

    fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
