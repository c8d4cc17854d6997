//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::NotesConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<NotesConfig, ConfigError> {
        MergeService::load()
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<NotesConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Load from `path` when given, otherwise from the standard sources.
    pub fn load_with_override(path: Option<&Path>) -> Result<NotesConfig, ConfigError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Self::load(),
        }
    }

    /// Create default configuration.
    pub fn default() -> NotesConfig {
        NotesConfig::default()
    }
}
