//! Content-store backing: note bodies live under a managed files directory,
//! one file per note keyed by file id, described by a metadata record.

use crate::backing::{BackingEntry, NoteBacking, Placement, Reconciliation, ScannedEntry, StorageMode};
use crate::error::ApiError;
use crate::store::metadata::{FileMetadata, FileMetadataStore, FileType};
use crate::tree::naming::{ensure_note_extension, first_free_name};
use crate::tree::{NodeMeta, NodeType};
use crate::types::{FileId, NOTE_EXTENSION};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct InternalBacking {
    files_dir: PathBuf,
    metadata: Arc<dyn FileMetadataStore>,
}

fn content_hash(content: &str) -> String {
    hex::encode(blake3::hash(content.as_bytes()).as_bytes())
}

impl InternalBacking {
    pub fn new(files_dir: impl AsRef<Path>, metadata: Arc<dyn FileMetadataStore>) -> Result<Self, ApiError> {
        let files_dir = files_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&files_dir).map_err(|e| ApiError::io(&files_dir, e))?;
        Ok(Self {
            files_dir,
            metadata,
        })
    }

    pub fn metadata(&self) -> &Arc<dyn FileMetadataStore> {
        &self.metadata
    }

    fn file_id(meta: &NodeMeta) -> Result<&FileId, ApiError> {
        meta.file_id.as_ref().ok_or_else(|| {
            ApiError::InvalidOperation(format!("node {} has no file id", meta.id))
        })
    }

    fn record_for(&self, meta: &NodeMeta) -> Result<FileMetadata, ApiError> {
        let file_id = Self::file_id(meta)?;
        self.metadata.get(file_id)?.ok_or_else(|| {
            ApiError::InvalidOperation(format!(
                "file record {} of node {} is missing",
                file_id, meta.id
            ))
        })
    }

    fn free_name(placement: &Placement<'_>, name: &str) -> String {
        first_free_name(name, |candidate| {
            placement.siblings.iter().any(|s| s == candidate)
        })
    }
}

impl NoteBacking for InternalBacking {
    fn mode(&self) -> StorageMode {
        StorageMode::Internal
    }

    fn safe_name(&self, placement: &Placement<'_>, name: &str) -> Result<String, ApiError> {
        Ok(Self::free_name(placement, name))
    }

    fn create_folder(&self, placement: &Placement<'_>, name: &str) -> Result<BackingEntry, ApiError> {
        Ok(BackingEntry {
            name: self.safe_name(placement, name)?,
            external_path: None,
            file_id: None,
        })
    }

    fn create_note(
        &self,
        placement: &Placement<'_>,
        name: &str,
        content: &str,
    ) -> Result<BackingEntry, ApiError> {
        let name = self.safe_name(placement, &ensure_note_extension(name))?;
        let file_id = uuid::Uuid::new_v4().to_string();
        let path = self.files_dir.join(format!("{}{}", file_id, NOTE_EXTENSION));
        std::fs::write(&path, content).map_err(|e| ApiError::io(&path, e))?;

        let record = FileMetadata {
            id: file_id.clone(),
            name: name.clone(),
            origin_name: name.clone(),
            path: path.clone(),
            size: content.len() as u64,
            ext: NOTE_EXTENSION.to_string(),
            file_type: FileType::Text,
            count: 1,
            content_hash: content_hash(content),
            created_at: Utc::now(),
        };
        if let Err(e) = self.metadata.add(&record) {
            if let Err(cleanup) = std::fs::remove_file(&path) {
                warn!("Failed to remove orphaned note file {}: {}", path.display(), cleanup);
            }
            return Err(e.into());
        }

        Ok(BackingEntry {
            name,
            external_path: None,
            file_id: Some(file_id),
        })
    }

    fn read_note(&self, meta: &NodeMeta) -> Result<String, ApiError> {
        let record = self.record_for(meta)?;
        std::fs::read_to_string(&record.path).map_err(|e| ApiError::io(&record.path, e))
    }

    fn write_note(&self, meta: &NodeMeta, content: &str) -> Result<(), ApiError> {
        let mut record = self.record_for(meta)?;
        std::fs::write(&record.path, content).map_err(|e| ApiError::io(&record.path, e))?;
        record.size = content.len() as u64;
        record.content_hash = content_hash(content);
        record.count += 1;
        self.metadata.update(&record)?;
        Ok(())
    }

    fn delete_note(&self, meta: &NodeMeta) -> Result<(), ApiError> {
        let file_id = Self::file_id(meta)?;
        if let Some(record) = self.metadata.get(file_id)? {
            match std::fs::remove_file(&record.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Note file already gone: {}", record.path.display());
                }
                Err(e) => return Err(ApiError::io(&record.path, e)),
            }
        }
        self.metadata.delete(file_id)?;
        Ok(())
    }

    fn delete_folder(&self, _meta: &NodeMeta) -> Result<(), ApiError> {
        Ok(())
    }

    fn rename(
        &self,
        meta: &NodeMeta,
        node_type: NodeType,
        new_name: &str,
    ) -> Result<BackingEntry, ApiError> {
        match node_type {
            NodeType::Folder => Ok(BackingEntry {
                name: new_name.to_string(),
                external_path: None,
                file_id: None,
            }),
            NodeType::File => {
                let name = ensure_note_extension(new_name);
                let mut record = self.record_for(meta)?;
                record.name = name.clone();
                self.metadata.update(&record)?;
                Ok(BackingEntry {
                    name,
                    external_path: None,
                    file_id: meta.file_id.clone(),
                })
            }
        }
    }

    fn relocate(&self, meta: &NodeMeta, _placement: &Placement<'_>) -> Result<BackingEntry, ApiError> {
        Ok(BackingEntry {
            name: meta.name.clone(),
            external_path: None,
            file_id: meta.file_id.clone(),
        })
    }

    fn reconcile(&self, meta: &NodeMeta) -> Result<Reconciliation, ApiError> {
        let Some(file_id) = meta.file_id.as_ref() else {
            return Ok(Reconciliation::Unchanged);
        };
        Ok(match self.metadata.get(file_id)? {
            None => Reconciliation::Missing,
            Some(record) if record.name != meta.name => Reconciliation::Renamed(record.name),
            Some(_) => Reconciliation::Unchanged,
        })
    }

    fn scan(&self) -> Result<Vec<ScannedEntry>, ApiError> {
        Err(ApiError::Unsupported {
            mode: self.mode().to_string(),
            operation: "scan".to_string(),
        })
    }
}
