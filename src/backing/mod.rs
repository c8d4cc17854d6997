//! Note Backing
//!
//! Storage strategy behind the notes tree. A store is constructed with exactly
//! one backing: `ExternalBacking` keeps notes as files and directories under a
//! notes root on disk, `InternalBacking` keeps note content in the crate's own
//! content store with a metadata record per note.

pub mod external;
pub mod internal;

use crate::error::ApiError;
use crate::tree::{NodeMeta, NodeType};
use crate::types::FileId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use external::ExternalBacking;
pub use internal::InternalBacking;

/// Storage mode a deployment runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    External,
    Internal,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::External => write!(f, "external"),
            StorageMode::Internal => write!(f, "internal"),
        }
    }
}

/// Destination level for a new, renamed or moved entry
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// Parent folder; `None` is the top level
    pub parent: Option<&'a NodeMeta>,
    /// Names already present at the destination level
    pub siblings: &'a [String],
}

/// Backing reference produced by create, rename and move
#[derive(Debug, Clone, PartialEq)]
pub struct BackingEntry {
    /// Final (possibly disambiguated) display name
    pub name: String,
    pub external_path: Option<PathBuf>,
    pub file_id: Option<FileId>,
}

impl BackingEntry {
    pub(crate) fn apply(self, meta: &mut NodeMeta) {
        meta.name = self.name;
        meta.external_path = self.external_path;
        meta.file_id = self.file_id;
    }
}

/// Outcome of checking a file node against its backing record
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    Unchanged,
    Renamed(String),
    Missing,
}

/// One entry found by walking the notes root
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedEntry {
    pub name: String,
    pub path: PathBuf,
    pub node_type: NodeType,
    pub children: Vec<ScannedEntry>,
}

/// Backing storage capability set
pub trait NoteBacking: Send + Sync {
    fn mode(&self) -> StorageMode;

    /// Disambiguated form of `name` at the destination level
    fn safe_name(&self, placement: &Placement<'_>, name: &str) -> Result<String, ApiError>;

    fn create_folder(&self, placement: &Placement<'_>, name: &str) -> Result<BackingEntry, ApiError>;

    fn create_note(
        &self,
        placement: &Placement<'_>,
        name: &str,
        content: &str,
    ) -> Result<BackingEntry, ApiError>;

    fn read_note(&self, meta: &NodeMeta) -> Result<String, ApiError>;

    fn write_note(&self, meta: &NodeMeta, content: &str) -> Result<(), ApiError>;

    fn delete_note(&self, meta: &NodeMeta) -> Result<(), ApiError>;

    /// Delete the folder entry itself; descendants are handled by the caller
    fn delete_folder(&self, meta: &NodeMeta) -> Result<(), ApiError>;

    /// Rename in place. Fails with `NameConflict` where the backing enforces unique names.
    fn rename(
        &self,
        meta: &NodeMeta,
        node_type: NodeType,
        new_name: &str,
    ) -> Result<BackingEntry, ApiError>;

    /// Move the entry under a new parent, keeping its name
    fn relocate(&self, meta: &NodeMeta, placement: &Placement<'_>) -> Result<BackingEntry, ApiError>;

    /// Check a file node against its backing record
    fn reconcile(&self, _meta: &NodeMeta) -> Result<Reconciliation, ApiError> {
        Ok(Reconciliation::Unchanged)
    }

    /// Walk the backing directory structure
    fn scan(&self) -> Result<Vec<ScannedEntry>, ApiError>;
}
