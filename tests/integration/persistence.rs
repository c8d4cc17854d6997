use notes_tree::backing::StorageMode;
use notes_tree::config::{NotesConfig, StorageConfig};
use notes_tree::notes::NotesTreeStore;
use notes_tree::store::{self, MemoryRecordStore, RecordStore};
use notes_tree::tree::{SortType, TreeNode};
use notes_tree::types::NOTES_TREE_KEY;
use tempfile::TempDir;

fn config(temp_dir: &TempDir, mode: StorageMode) -> NotesConfig {
    NotesConfig {
        storage: StorageConfig {
            mode,
            notes_root: None,
            data_dir: Some(temp_dir.path().to_path_buf()),
        },
        ..NotesConfig::default()
    }
}

#[test]
fn test_tree_survives_reopen_internal() {
    let temp_dir = TempDir::new().unwrap();
    let (folder_id, note_id) = {
        let store = NotesTreeStore::open(&config(&temp_dir, StorageMode::Internal)).unwrap();
        let folder = store.create_folder("kept", None).unwrap();
        let note = store.create_note("n", "persisted", Some(folder.id())).unwrap();
        store.sort_all_levels(SortType::UpdatedDesc).unwrap();
        (folder.id().to_string(), note.id().to_string())
    };

    let store = NotesTreeStore::open(&config(&temp_dir, StorageMode::Internal)).unwrap();
    let tree = store.get_tree();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id(), folder_id);
    assert_eq!(tree[0].children()[0].id(), note_id);
    assert_eq!(store.read_note(&note_id).unwrap(), "persisted");
    assert_eq!(store.settings().sort_type, SortType::UpdatedDesc);
}

#[test]
fn test_tree_survives_reopen_external() {
    let temp_dir = TempDir::new().unwrap();
    let note_id = {
        let store = NotesTreeStore::open(&config(&temp_dir, StorageMode::External)).unwrap();
        store.create_note("n", "on disk", None).unwrap().id().to_string()
    };
    assert!(temp_dir.path().join("notes").join("n.md").exists());

    let store = NotesTreeStore::open(&config(&temp_dir, StorageMode::External)).unwrap();
    assert_eq!(store.read_note(&note_id).unwrap(), "on disk");
}

#[test]
fn test_wire_format_field_names() {
    let records = MemoryRecordStore::new();
    let json = r#"[
        {"id":"f1","name":"Folder","treePath":"/Folder","type":"folder","expanded":true,
         "children":[{"id":"n1","name":"a.md","treePath":"/Folder/a.md","type":"file",
                      "externalPath":"/notes/Folder/a.md","is_starred":true}]}
    ]"#;
    records.put(NOTES_TREE_KEY, json.as_bytes()).unwrap();

    let forest = store::load_forest(&records).unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest.get("n1").unwrap().parent.as_deref(), Some("f1"));

    store::save_forest(&records, &forest).unwrap();
    let raw = records.get(NOTES_TREE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let note = &value[0]["children"][0];
    assert_eq!(note["externalPath"], "/notes/Folder/a.md");
    assert_eq!(note["is_starred"], true);
    assert_eq!(note["type"], "file");

    let nodes: Vec<TreeNode> = serde_json::from_value(value).unwrap();
    assert_eq!(nodes[0].children()[0].name(), "a.md");
}

#[test]
fn test_corrupt_record_yields_empty_tree() {
    let temp_dir = TempDir::new().unwrap();
    let cfg = config(&temp_dir, StorageMode::Internal);
    {
        let db = store::open_db(&cfg.storage.db_path().unwrap()).unwrap();
        let records = store::SledRecordStore::new(&db).unwrap();
        records.put(NOTES_TREE_KEY, b"{not json").unwrap();
    }
    let store = NotesTreeStore::open(&cfg).unwrap();
    assert!(store.get_tree().is_empty());
}
