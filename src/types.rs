//! Core identifier and key types.

/// NodeId: opaque identifier of a tree node, generated at creation
pub type NodeId = String;

/// FileId: key of a note's record in the file-metadata store (internal mode)
pub type FileId = String;

/// Fixed key of the persisted notes tree record
pub const NOTES_TREE_KEY: &str = "notes-tree";

/// Fixed key of the persisted UI settings record
pub const NOTES_SETTINGS_KEY: &str = "notes-settings";

/// Extension carried by every note file name
pub const NOTE_EXTENSION: &str = ".md";

/// Generate a fresh node identifier
pub fn new_node_id() -> NodeId {
    uuid::Uuid::new_v4().to_string()
}
