//! Notes Tree: hierarchical notes kept in sync with their backing storage
//!
//! A tree of folders and markdown notes persisted as one record. Each note
//! is backed either by a file under a notes directory (external mode) or by
//! a managed content store with file metadata (internal mode).

pub mod backing;
pub mod config;
pub mod error;
pub mod logging;
pub mod notes;
pub mod settings;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use backing::StorageMode;
pub use error::{ApiError, StorageError};
pub use notes::{NotesTreeStore, ParentPolicy};
pub use tree::{MovePosition, NodeType, SortType, TreeNode, TreeNodeKind};
