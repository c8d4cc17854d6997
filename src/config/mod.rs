//! Configuration
//!
//! Layered configuration for the notes tree: built-in defaults, the global
//! TOML file, an explicit `--config` file, and `NOTES_TREE__*` environment
//! variables.

mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::backing::StorageMode;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::notes::ParentPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    /// Handling of create requests whose parent is not a folder
    #[serde(default)]
    pub parent_policy: ParentPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backing mode: external (files on disk) or internal (content store)
    #[serde(default)]
    pub mode: StorageMode,

    /// Notes root directory for external mode; defaults to `<data_dir>/notes`
    #[serde(default)]
    pub notes_root: Option<PathBuf>,

    /// Directory for the database and internal content store; defaults to
    /// `$XDG_DATA_HOME/notes-tree`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ApiError> {
        match &self.data_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.clone()),
            _ => xdg::data_dir(),
        }
    }

    pub fn resolve_notes_root(&self) -> Result<PathBuf, ApiError> {
        match &self.notes_root {
            Some(root) if !root.as_os_str().is_empty() => Ok(root.clone()),
            _ => Ok(self.resolve_data_dir()?.join("notes")),
        }
    }

    /// Sled database holding the tree record and file metadata
    pub fn db_path(&self) -> Result<PathBuf, ApiError> {
        Ok(self.resolve_data_dir()?.join("db"))
    }

    /// Content store for internal-mode note bodies
    pub fn files_dir(&self) -> Result<PathBuf, ApiError> {
        Ok(self.resolve_data_dir()?.join("files"))
    }
}
