use notes_tree::backing::{ExternalBacking, InternalBacking};
use notes_tree::notes::{NotesTreeStore, ParentPolicy};
use notes_tree::store::{MemoryFileMetadataStore, MemoryRecordStore};
use notes_tree::tree::TreeNode;
use std::sync::Arc;
use tempfile::TempDir;

pub fn internal_store(temp_dir: &TempDir) -> NotesTreeStore {
    internal_store_with_metadata(temp_dir).0
}

/// Internal-mode store plus a handle on its metadata records
pub fn internal_store_with_metadata(
    temp_dir: &TempDir,
) -> (NotesTreeStore, Arc<MemoryFileMetadataStore>) {
    let metadata = Arc::new(MemoryFileMetadataStore::new());
    let backing = InternalBacking::new(temp_dir.path().join("files"), metadata.clone()).unwrap();
    let store = NotesTreeStore::new(
        Box::new(backing),
        Arc::new(MemoryRecordStore::new()),
        ParentPolicy::Reject,
    );
    (store, metadata)
}

pub fn external_store(temp_dir: &TempDir) -> NotesTreeStore {
    let backing = ExternalBacking::new(temp_dir.path().join("notes")).unwrap();
    NotesTreeStore::new(
        Box::new(backing),
        Arc::new(MemoryRecordStore::new()),
        ParentPolicy::Reject,
    )
}

/// Names of one level, in order
pub fn names(nodes: &[TreeNode]) -> Vec<String> {
    nodes.iter().map(|n| n.name().to_string()).collect()
}
