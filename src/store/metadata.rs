//! File metadata store for internal-mode notes.
//!
//! One record per stored note file: display name, on-disk location, size,
//! type, use count and content hash. Records are bincode-encoded.

use crate::error::StorageError;
use crate::types::FileId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const METADATA_TREE: &str = "file_metadata";

/// Coarse content type of a stored file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Text,
    Other,
}

/// Metadata record for one stored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: FileId,
    /// Display name, e.g. `todo.md`
    pub name: String,
    /// Name the file was first stored under
    pub origin_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub ext: String,
    pub file_type: FileType,
    /// Number of times the content was written
    pub count: u64,
    /// Hex-encoded blake3 hash of the current content
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata store interface
pub trait FileMetadataStore: Send + Sync {
    fn add(&self, record: &FileMetadata) -> Result<(), StorageError>;
    fn get(&self, id: &str) -> Result<Option<FileMetadata>, StorageError>;
    fn update(&self, record: &FileMetadata) -> Result<(), StorageError>;
    /// Returns whether a record was deleted
    fn delete(&self, id: &str) -> Result<bool, StorageError>;
    fn list(&self) -> Result<Vec<FileMetadata>, StorageError>;
}

/// Sled-backed metadata store
pub struct SledFileMetadataStore {
    tree: sled::Tree,
}

impl SledFileMetadataStore {
    pub fn new(db: &sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(METADATA_TREE)?,
        })
    }

    fn write(&self, record: &FileMetadata) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record)?;
        self.tree.insert(record.id.as_bytes(), bytes)?;
        self.tree.flush()?;
        Ok(())
    }
}

impl FileMetadataStore for SledFileMetadataStore {
    fn add(&self, record: &FileMetadata) -> Result<(), StorageError> {
        self.write(record)
    }

    fn get(&self, id: &str) -> Result<Option<FileMetadata>, StorageError> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn update(&self, record: &FileMetadata) -> Result<(), StorageError> {
        if !self.tree.contains_key(record.id.as_bytes())? {
            return Err(StorageError::Corrupt {
                key: record.id.clone(),
                reason: "metadata record does not exist".to_string(),
            });
        }
        self.write(record)
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.tree.remove(id.as_bytes())?.is_some();
        self.tree.flush()?;
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<FileMetadata>, StorageError> {
        let mut out = Vec::new();
        for entry in self.tree.iter() {
            let (_, bytes) = entry?;
            out.push(bincode::deserialize(&bytes)?);
        }
        Ok(out)
    }
}

/// In-memory metadata store
#[derive(Default)]
pub struct MemoryFileMetadataStore {
    records: RwLock<HashMap<FileId, FileMetadata>>,
}

impl MemoryFileMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileMetadataStore for MemoryFileMetadataStore {
    fn add(&self, record: &FileMetadata) -> Result<(), StorageError> {
        self.records.write().insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<FileMetadata>, StorageError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn update(&self, record: &FileMetadata) -> Result<(), StorageError> {
        let mut records = self.records.write();
        match records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StorageError::Corrupt {
                key: record.id.clone(),
                reason: "metadata record does not exist".to_string(),
            }),
        }
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.records.write().remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<FileMetadata>, StorageError> {
        Ok(self.records.read().values().cloned().collect())
    }
}
