//! Filesystem backing: notes are `.md` files and directories under a notes root.

use crate::backing::{BackingEntry, NoteBacking, Placement, ScannedEntry, StorageMode};
use crate::error::ApiError;
use crate::tree::naming::{ensure_note_extension, first_free_name, has_note_extension};
use crate::tree::{NodeMeta, NodeType};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct ExternalBacking {
    root: PathBuf,
}

impl ExternalBacking {
    /// Use `root` as the notes root, creating it if needed
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ApiError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| ApiError::io(root, e))?;
        let root = dunce::canonicalize(root).map_err(|e| ApiError::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, placement: &Placement<'_>) -> Result<PathBuf, ApiError> {
        match placement.parent {
            Some(parent) => Self::path_of(parent),
            None => Ok(self.root.clone()),
        }
    }

    fn path_of(meta: &NodeMeta) -> Result<PathBuf, ApiError> {
        meta.external_path.clone().ok_or_else(|| {
            ApiError::InvalidOperation(format!("node {} has no external path", meta.id))
        })
    }

    fn free_name_in(dir: &Path, name: &str) -> String {
        first_free_name(name, |candidate| dir.join(candidate).exists())
    }

    fn scan_dir(dir: &Path) -> Vec<ScannedEntry> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping non UTF8 entry: {:?}", entry.path());
                    continue;
                }
            };
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path().to_path_buf();
            if entry.file_type().is_dir() {
                let children = Self::scan_dir(&path);
                entries.push(ScannedEntry {
                    name,
                    path,
                    node_type: NodeType::Folder,
                    children,
                });
            } else if entry.file_type().is_file() && has_note_extension(&name) {
                entries.push(ScannedEntry {
                    name,
                    path,
                    node_type: NodeType::File,
                    children: Vec::new(),
                });
            }
        }
        entries
    }
}

fn ignore_missing(result: std::io::Result<()>, path: &Path) -> Result<(), ApiError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Backing entry already gone: {}", path.display());
            Ok(())
        }
        Err(e) => Err(ApiError::io(path, e)),
    }
}

impl NoteBacking for ExternalBacking {
    fn mode(&self) -> StorageMode {
        StorageMode::External
    }

    fn safe_name(&self, placement: &Placement<'_>, name: &str) -> Result<String, ApiError> {
        let dir = self.dir_for(placement)?;
        Ok(Self::free_name_in(&dir, name))
    }

    fn create_folder(&self, placement: &Placement<'_>, name: &str) -> Result<BackingEntry, ApiError> {
        let dir = self.dir_for(placement)?;
        let name = self.safe_name(placement, name)?;
        let path = dir.join(&name);
        std::fs::create_dir(&path).map_err(|e| ApiError::io(&path, e))?;
        Ok(BackingEntry {
            name,
            external_path: Some(path),
            file_id: None,
        })
    }

    fn create_note(
        &self,
        placement: &Placement<'_>,
        name: &str,
        content: &str,
    ) -> Result<BackingEntry, ApiError> {
        let dir = self.dir_for(placement)?;
        let name = self.safe_name(placement, &ensure_note_extension(name))?;
        let path = dir.join(&name);
        std::fs::write(&path, content).map_err(|e| ApiError::io(&path, e))?;
        Ok(BackingEntry {
            name,
            external_path: Some(path),
            file_id: None,
        })
    }

    fn read_note(&self, meta: &NodeMeta) -> Result<String, ApiError> {
        let path = Self::path_of(meta)?;
        std::fs::read_to_string(&path).map_err(|e| ApiError::io(&path, e))
    }

    fn write_note(&self, meta: &NodeMeta, content: &str) -> Result<(), ApiError> {
        let path = Self::path_of(meta)?;
        std::fs::write(&path, content).map_err(|e| ApiError::io(&path, e))
    }

    fn delete_note(&self, meta: &NodeMeta) -> Result<(), ApiError> {
        let path = Self::path_of(meta)?;
        ignore_missing(std::fs::remove_file(&path), &path)
    }

    fn delete_folder(&self, meta: &NodeMeta) -> Result<(), ApiError> {
        let path = Self::path_of(meta)?;
        ignore_missing(std::fs::remove_dir_all(&path), &path)
    }

    fn rename(
        &self,
        meta: &NodeMeta,
        node_type: NodeType,
        new_name: &str,
    ) -> Result<BackingEntry, ApiError> {
        let current = Self::path_of(meta)?;
        let dir = current
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        let new_name = match node_type {
            NodeType::File => ensure_note_extension(new_name),
            NodeType::Folder => new_name.to_string(),
        };
        let target = dir.join(&new_name);
        if target != current {
            let safe = Self::free_name_in(&dir, &new_name);
            if safe != new_name {
                return Err(ApiError::NameConflict(new_name));
            }
            std::fs::rename(&current, &target).map_err(|e| ApiError::io(&current, e))?;
        }
        Ok(BackingEntry {
            name: new_name,
            external_path: Some(target),
            file_id: None,
        })
    }

    fn relocate(&self, meta: &NodeMeta, placement: &Placement<'_>) -> Result<BackingEntry, ApiError> {
        let current = Self::path_of(meta)?;
        let dir = self.dir_for(placement)?;
        let target = dir.join(&meta.name);
        if target != current {
            if target.exists() {
                return Err(ApiError::NameConflict(meta.name.clone()));
            }
            std::fs::rename(&current, &target).map_err(|e| ApiError::io(&current, e))?;
        }
        Ok(BackingEntry {
            name: meta.name.clone(),
            external_path: Some(target),
            file_id: None,
        })
    }

    fn scan(&self) -> Result<Vec<ScannedEntry>, ApiError> {
        Ok(Self::scan_dir(&self.root))
    }
}
