//! Notes Tree Store
//!
//! Owns the canonical notes forest: loads it from the record store, applies
//! structural operations, mirrors them onto the configured backing, and
//! persists the result.

mod service;
mod sync;

use serde::{Deserialize, Serialize};

pub use service::NotesTreeStore;

/// What to do when a create operation names a parent that is not a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentPolicy {
    /// Fail with `InvalidParent` (file parent) or `NodeNotFound` (unknown parent)
    #[default]
    Reject,
    /// Log a warning and insert at the top level instead
    Root,
}
