//! Record Store
//!
//! Persistence collaborators: a key/value store holding the serialized notes
//! tree and the settings record, and the file-metadata store used by
//! internal-mode backing.

pub mod metadata;
pub mod persistence;

use crate::error::StorageError;
use crate::settings::NotesSettings;
use crate::tree::{Forest, TreeNode};
use crate::types::{NOTES_SETTINGS_KEY, NOTES_TREE_KEY};

pub use metadata::{FileMetadata, FileMetadataStore, MemoryFileMetadataStore, SledFileMetadataStore};
pub use persistence::{open_db, MemoryRecordStore, SledRecordStore};

/// Record store interface: whole values by key
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// Load the persisted forest; an absent record is an empty forest
pub fn load_forest(store: &dyn RecordStore) -> Result<Forest, StorageError> {
    let Some(bytes) = store.get(NOTES_TREE_KEY)? else {
        return Ok(Forest::new());
    };
    let nodes: Vec<TreeNode> = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        key: NOTES_TREE_KEY.to_string(),
        reason: e.to_string(),
    })?;
    Forest::from_nodes(nodes)
}

/// Replace the persisted forest with `forest`
pub fn save_forest(store: &dyn RecordStore, forest: &Forest) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(&forest.to_nodes())?;
    store.put(NOTES_TREE_KEY, &bytes)
}

pub fn load_settings(store: &dyn RecordStore) -> Result<NotesSettings, StorageError> {
    match store.get(NOTES_SETTINGS_KEY)? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(NotesSettings::default()),
    }
}

pub fn save_settings(store: &dyn RecordStore, settings: &NotesSettings) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(settings)?;
    store.put(NOTES_SETTINGS_KEY, &bytes)
}
