use crate::common::{internal_store, internal_store_with_metadata, names};
use notes_tree::error::ApiError;
use notes_tree::store::FileMetadataStore;
use notes_tree::tree::{MovePosition, SortType, TreeNodeKind};
use tempfile::TempDir;

#[test]
fn test_create_assigns_paths_and_extension() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let folder = store.create_folder("Work", None).unwrap();
    let note = store.create_note("plan", "draft", Some(folder.id())).unwrap();

    assert_eq!(folder.meta.tree_path, "/Work");
    assert_eq!(note.name(), "plan.md");
    assert_eq!(note.meta.tree_path, "/Work/plan.md");
    assert!(note.meta.file_id.is_some());
    assert!(note.meta.external_path.is_none());
    assert_eq!(store.read_note(note.id()).unwrap(), "draft");
}

#[test]
fn test_forbidden_characters_are_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);
    let note = store.create_note("a/b:c", "", None).unwrap();
    assert_eq!(note.name(), "a_b_c.md");
}

#[test]
fn test_delete_folder_cascades() {
    let temp_dir = TempDir::new().unwrap();
    let (store, metadata) = internal_store_with_metadata(&temp_dir);

    let outer = store.create_folder("outer", None).unwrap();
    let inner = store.create_folder("inner", Some(outer.id())).unwrap();
    let deep = store.create_note("deep", "x", Some(inner.id())).unwrap();
    let keep = store.create_note("keep", "y", None).unwrap();

    let doomed_file = deep.meta.file_id.clone().unwrap();
    store.delete_node(outer.id()).unwrap();

    let tree = store.get_tree();
    assert_eq!(names(&tree), vec!["keep.md"]);
    assert!(metadata.get(&doomed_file).unwrap().is_none());
    let records = metadata.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, keep.meta.file_id.clone().unwrap());
    let files: Vec<_> = std::fs::read_dir(temp_dir.path().join("files"))
        .unwrap()
        .collect();
    assert_eq!(files.len(), 1);
    assert!(matches!(
        store.find_node(deep.id()),
        Err(ApiError::NodeNotFound(_))
    ));
    assert_eq!(store.read_note(keep.id()).unwrap(), "y");
}

#[test]
fn test_delete_unknown_node_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);
    assert!(matches!(
        store.delete_node("nope"),
        Err(ApiError::NodeNotFound(_))
    ));
}

#[test]
fn test_rename_updates_tree_path_of_subtree() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let folder = store.create_folder("old", None).unwrap();
    let note = store.create_note("n", "", Some(folder.id())).unwrap();
    store.rename_node(folder.id(), "new").unwrap();

    let renamed = store.find_node(note.id()).unwrap();
    assert_eq!(renamed.meta.tree_path, "/new/n.md");
}

#[test]
fn test_rename_file_keeps_extension() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);
    let note = store.create_note("n", "", None).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let renamed = store.rename_node(note.id(), "ideas").unwrap();
    assert_eq!(renamed.name(), "ideas.md");
    assert!(renamed.meta.updated_at > note.meta.updated_at);
    assert_eq!(renamed.meta.created_at, note.meta.created_at);
}

#[test]
fn test_delete_only_note_empties_content_store() {
    let temp_dir = TempDir::new().unwrap();
    let (store, metadata) = internal_store_with_metadata(&temp_dir);
    let folder = store.create_folder("f", None).unwrap();
    store.create_note("a", "x", Some(folder.id())).unwrap();
    store.create_note("b", "y", Some(folder.id())).unwrap();

    store.delete_node(folder.id()).unwrap();
    assert!(metadata.list().unwrap().is_empty());
    let files = std::fs::read_dir(temp_dir.path().join("files")).unwrap();
    assert_eq!(files.count(), 0);
}

#[test]
fn test_get_tree_applies_metadata_changes() {
    let temp_dir = TempDir::new().unwrap();
    let (store, metadata) = internal_store_with_metadata(&temp_dir);
    let folder = store.create_folder("F", None).unwrap();
    let a = store.create_note("a", "", Some(folder.id())).unwrap();
    let b = store.create_note("b", "", Some(folder.id())).unwrap();

    let mut record = metadata.get(a.meta.file_id.as_ref().unwrap()).unwrap().unwrap();
    record.name = "renamed.md".to_string();
    metadata.update(&record).unwrap();
    assert!(metadata.delete(b.meta.file_id.as_ref().unwrap()).unwrap());

    let tree = store.get_tree();
    assert_eq!(names(tree[0].children()), vec!["renamed.md"]);
    assert_eq!(tree[0].children()[0].id(), a.id());
    assert_eq!(tree[0].children()[0].meta.tree_path, "/F/renamed.md");
    assert!(matches!(
        store.find_node(b.id()),
        Err(ApiError::NodeNotFound(_))
    ));
    assert_eq!(store.find_node(a.id()).unwrap().name(), "renamed.md");
    assert_eq!(store.get_tree(), tree);
}

#[test]
fn test_move_into_own_descendant_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let a = store.create_folder("a", None).unwrap();
    let b = store.create_folder("b", Some(a.id())).unwrap();
    let before = store.get_tree();

    assert!(!store.move_node(a.id(), b.id(), MovePosition::Inside).unwrap());
    assert!(!store.move_node(a.id(), a.id(), MovePosition::Inside).unwrap());
    assert_eq!(store.get_tree(), before);
}

#[test]
fn test_move_inside_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let note = store.create_note("a", "", None).unwrap();
    let other = store.create_note("b", "", None).unwrap();
    assert!(!store
        .move_node(other.id(), note.id(), MovePosition::Inside)
        .unwrap());
    assert!(!store
        .move_node("ghost", note.id(), MovePosition::Before)
        .unwrap());
}

#[test]
fn test_move_before_and_after_positions() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let a = store.create_note("a", "", None).unwrap();
    let b = store.create_note("b", "", None).unwrap();
    let c = store.create_note("c", "", None).unwrap();

    assert!(store.move_node(c.id(), a.id(), MovePosition::Before).unwrap());
    assert_eq!(names(&store.get_tree()), vec!["c.md", "a.md", "b.md"]);

    assert!(store.move_node(c.id(), b.id(), MovePosition::After).unwrap());
    assert_eq!(names(&store.get_tree()), vec!["a.md", "b.md", "c.md"]);
}

#[test]
fn test_move_out_of_folder_then_sort_groups_folders_first() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let a = store.create_folder("A", None).unwrap();
    let b = store.create_note("B", "", Some(a.id())).unwrap();

    assert!(store.move_node(b.id(), a.id(), MovePosition::Before).unwrap());
    let moved = store.get_tree();
    assert_eq!(names(&moved), vec!["B.md", "A"]);
    assert_eq!(moved[0].meta.tree_path, "/B.md");

    store.sort_all_levels(SortType::NameAsc).unwrap();
    assert_eq!(names(&store.get_tree()), vec!["A", "B.md"]);
}

#[test]
fn test_sort_orders_every_level() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);

    let folder = store.create_folder("folder", None).unwrap();
    store.create_note("zeta", "", Some(folder.id())).unwrap();
    store.create_note("Alpha", "", Some(folder.id())).unwrap();
    store.create_note("beta", "", None).unwrap();

    store.sort_all_levels(SortType::NameDesc).unwrap();
    let tree = store.get_tree();
    assert_eq!(names(&tree), vec!["folder", "beta.md"]);
    assert_eq!(names(tree[0].children()), vec!["zeta.md", "Alpha.md"]);

    store.sort_all_levels(SortType::NameAsc).unwrap();
    let tree = store.get_tree();
    assert_eq!(names(tree[0].children()), vec!["Alpha.md", "zeta.md"]);
}

#[test]
fn test_get_tree_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);
    let folder = store.create_folder("f", None).unwrap();
    store.create_note("n", "", Some(folder.id())).unwrap();

    let first = store.get_tree();
    let second = store.get_tree();
    assert_eq!(first, second);
}

#[test]
fn test_toggle_flags_are_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);
    let note = store.create_note("n", "", None).unwrap();

    store.toggle_starred(note.id()).unwrap();
    assert!(matches!(
        store.find_node(note.id()).unwrap().kind,
        TreeNodeKind::File { is_starred: true }
    ));
    store.toggle_starred(note.id()).unwrap();
    assert!(matches!(
        store.find_node(note.id()).unwrap().kind,
        TreeNodeKind::File { is_starred: false }
    ));
}

#[test]
fn test_upload_imports_file_content() {
    let temp_dir = TempDir::new().unwrap();
    let store = internal_store(&temp_dir);
    let source = temp_dir.path().join("meeting.txt");
    std::fs::write(&source, "agenda").unwrap();

    let note = store.upload_note(&source, None).unwrap();
    assert_eq!(note.name(), "meeting.md");
    assert_eq!(store.read_note(note.id()).unwrap(), "agenda");
}
