//! Record store implementations: sled-backed and in-memory.

use crate::error::StorageError;
use crate::store::RecordStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

const RECORDS_TREE: &str = "records";

/// Open (or create) the sled database at `path`
pub fn open_db(path: &Path) -> Result<sled::Db, StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(sled::open(path)?)
}

/// Sled-backed record store
pub struct SledRecordStore {
    tree: sled::Tree,
}

impl SledRecordStore {
    pub fn new(db: &sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(RECORDS_TREE)?,
        })
    }
}

impl RecordStore for SledRecordStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value)?;
        self.tree.flush()?;
        Ok(())
    }
}

/// In-memory record store
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.records.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
