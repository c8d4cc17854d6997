use crate::common::{external_store, names};
use notes_tree::error::ApiError;
use notes_tree::tree::{MovePosition, SortType, TreeNodeKind};
use tempfile::TempDir;

#[test]
fn test_create_writes_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let folder = store.create_folder("Work", None).unwrap();
    let note = store.create_note("todo", "- milk", Some(folder.id())).unwrap();

    let folder_path = folder.meta.external_path.clone().unwrap();
    let note_path = note.meta.external_path.clone().unwrap();
    assert!(folder_path.is_dir());
    assert_eq!(note_path.parent(), Some(folder_path.as_path()));
    assert_eq!(std::fs::read_to_string(&note_path).unwrap(), "- milk");
    assert!(note.meta.file_id.is_none());
}

#[test]
fn test_duplicate_names_get_safe_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    store.create_note("note", "", None).unwrap();
    let second = store.create_note("note", "", None).unwrap();
    assert_eq!(second.name(), "note (1).md");
    assert!(second.meta.external_path.unwrap().exists());
}

#[test]
fn test_rename_folder_rebases_descendants() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let folder = store.create_folder("old", None).unwrap();
    let note = store.create_note("n", "body", Some(folder.id())).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let renamed = store.rename_node(folder.id(), "new").unwrap();
    assert_eq!(renamed.name(), "new");
    assert!(renamed.meta.updated_at > folder.meta.updated_at);

    let moved = store.find_node(note.id()).unwrap();
    let path = moved.meta.external_path.unwrap();
    assert!(path.ends_with("new/n.md"));
    assert_eq!(moved.meta.tree_path, "/new/n.md");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "body");
    assert_eq!(store.read_note(note.id()).unwrap(), "body");
}

#[test]
fn test_move_relocates_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let folder = store.create_folder("dest", None).unwrap();
    let note = store.create_note("n", "x", None).unwrap();
    let old_path = note.meta.external_path.clone().unwrap();

    assert!(store
        .move_node(note.id(), folder.id(), MovePosition::Inside)
        .unwrap());
    let moved = store.find_node(note.id()).unwrap();
    let new_path = moved.meta.external_path.unwrap();
    assert!(!old_path.exists());
    assert!(new_path.ends_with("dest/n.md"));
    assert_eq!(moved.meta.tree_path, "/dest/n.md");
}

#[test]
fn test_move_onto_existing_name_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let folder = store.create_folder("dest", None).unwrap();
    store.create_note("n", "inside", Some(folder.id())).unwrap();
    let outside = store.create_note("n", "outside", None).unwrap();
    let before = store.get_tree();

    assert!(!store
        .move_node(outside.id(), folder.id(), MovePosition::Inside)
        .unwrap());
    assert_eq!(store.get_tree(), before);
    assert_eq!(store.read_note(outside.id()).unwrap(), "outside");
}

#[test]
fn test_delete_folder_removes_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let folder = store.create_folder("gone", None).unwrap();
    store.create_note("n", "", Some(folder.id())).unwrap();
    let dir = folder.meta.external_path.clone().unwrap();

    store.delete_node(folder.id()).unwrap();
    assert!(!dir.exists());
    assert!(store.get_tree().is_empty());
}

#[test]
fn test_update_note_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);
    let note = store.create_note("n", "one", None).unwrap();
    store.update_note(note.id(), "two").unwrap();
    let path = note.meta.external_path.unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "two");
}

#[test]
fn test_sync_picks_up_disk_changes_and_keeps_ids() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let kept = store.create_note("kept", "", None).unwrap();
    store.toggle_starred(kept.id()).unwrap();
    let root = temp_dir.path().join("notes");
    std::fs::create_dir(root.join("Inbox")).unwrap();
    std::fs::write(root.join("Inbox").join("new.md"), "fresh").unwrap();
    std::fs::write(root.join("ignored.txt"), "not a note").unwrap();

    let tree = store.sync_from_disk().unwrap();
    assert_eq!(names(&tree), vec!["Inbox", "kept.md"]);
    assert_eq!(names(tree[0].children()), vec!["new.md"]);
    assert_eq!(tree[0].children()[0].meta.tree_path, "/Inbox/new.md");
    assert_eq!(tree[1].id(), kept.id());
    assert!(matches!(
        tree[1].kind,
        TreeNodeKind::File { is_starred: true }
    ));
}

#[test]
fn test_sync_drops_vanished_entries() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);
    let note = store.create_note("n", "", None).unwrap();
    std::fs::remove_file(note.meta.external_path.as_ref().unwrap()).unwrap();

    store.sort_all_levels(SortType::NameAsc).unwrap();
    assert!(store.sync_from_disk().unwrap().is_empty());
    assert!(matches!(
        store.find_node(note.id()),
        Err(ApiError::NodeNotFound(_))
    ));
}

#[test]
fn test_find_by_path_resolves_backing_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = external_store(&temp_dir);

    let folder = store.create_folder("Work", None).unwrap();
    let note = store.create_note("todo", "", Some(folder.id())).unwrap();
    let path = note.meta.external_path.clone().unwrap();

    let found = store.find_by_path(&path).unwrap().unwrap();
    assert_eq!(found.id(), note.id());
    let dir = store
        .find_by_path(folder.meta.external_path.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(dir.children()[0].id(), note.id());
    assert!(store
        .find_by_path(&path.with_file_name("missing.md"))
        .unwrap()
        .is_none());
}
