//! Structural operations on the notes tree.
//!
//! Every mutation is a load / mutate / persist cycle over the whole forest,
//! serialized by `write_lock`. Backing side effects happen before the
//! persist step; when one fails the mutated forest is dropped unsaved.

use crate::backing::{
    ExternalBacking, InternalBacking, NoteBacking, Placement, Reconciliation, StorageMode,
};
use crate::config::NotesConfig;
use crate::error::ApiError;
use crate::notes::ParentPolicy;
use crate::settings::NotesSettings;
use crate::store::{self, RecordStore, SledFileMetadataStore, SledRecordStore};
use crate::tree::naming::{ensure_note_extension, sanitize_name};
use crate::tree::{
    Forest, MovePosition, NodeKind, NodeMeta, NodeRecord, NodeType, SortType, TreeNode,
};
use crate::types::{new_node_id, NodeId};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct NotesTreeStore {
    pub(super) backing: Box<dyn NoteBacking>,
    pub(super) records: Arc<dyn RecordStore>,
    parent_policy: ParentPolicy,
    pub(super) write_lock: Mutex<()>,
}

impl NotesTreeStore {
    pub fn new(
        backing: Box<dyn NoteBacking>,
        records: Arc<dyn RecordStore>,
        parent_policy: ParentPolicy,
    ) -> Self {
        Self {
            backing,
            records,
            parent_policy,
            write_lock: Mutex::new(()),
        }
    }

    /// Build a store from configuration: sled under the data dir plus the configured backing
    pub fn open(config: &NotesConfig) -> Result<Self, ApiError> {
        let storage = &config.storage;
        let db = store::open_db(&storage.db_path()?)?;
        let records: Arc<dyn RecordStore> = Arc::new(SledRecordStore::new(&db)?);
        let backing: Box<dyn NoteBacking> = match storage.mode {
            StorageMode::External => Box::new(ExternalBacking::new(storage.resolve_notes_root()?)?),
            StorageMode::Internal => {
                let metadata = Arc::new(SledFileMetadataStore::new(&db)?);
                Box::new(InternalBacking::new(storage.files_dir()?, metadata)?)
            }
        };
        info!(mode = %storage.mode, "Opened notes tree store");
        Ok(Self::new(backing, records, config.parent_policy))
    }

    pub fn mode(&self) -> StorageMode {
        self.backing.mode()
    }

    pub(super) fn load(&self) -> Result<Forest, ApiError> {
        Ok(store::load_forest(self.records.as_ref())?)
    }

    pub(super) fn save(&self, forest: &Forest) -> Result<(), ApiError> {
        store::save_forest(self.records.as_ref(), forest).map_err(|e| {
            error!("Failed to persist notes tree: {}", e);
            ApiError::from(e)
        })
    }

    /// Persisted UI settings; defaults when unreadable
    pub fn settings(&self) -> NotesSettings {
        store::load_settings(self.records.as_ref()).unwrap_or_else(|e| {
            warn!("Failed to load notes settings, using defaults: {}", e);
            NotesSettings::default()
        })
    }

    /// Load the forest, reconciling file nodes against their backing records.
    ///
    /// Never fails: an unreadable record yields an empty forest.
    pub fn get_tree(&self) -> Vec<TreeNode> {
        let _guard = self.write_lock.lock();
        let mut forest = match self.load() {
            Ok(forest) => forest,
            Err(e) => {
                error!("Failed to load notes tree: {}", e);
                return Vec::new();
            }
        };

        if self.reconcile(&mut forest) {
            if let Err(e) = self.save(&forest) {
                warn!("Reconciled notes tree was not persisted: {}", e);
            }
        }
        forest.to_nodes()
    }

    fn reconcile(&self, forest: &mut Forest) -> bool {
        let file_ids: Vec<NodeId> = forest
            .preorder()
            .into_iter()
            .filter(|r| !r.is_folder())
            .map(|r| r.meta.id.clone())
            .collect();

        let mut changed = false;
        for id in file_ids {
            let Some(record) = forest.get(&id) else {
                continue;
            };
            match self.backing.reconcile(&record.meta) {
                Ok(Reconciliation::Unchanged) => {}
                Ok(Reconciliation::Renamed(name)) => {
                    info!(node_id = %id, name = %name, "Syncing note name from file record");
                    if let Some(record) = forest.get_mut(&id) {
                        record.meta.name = name;
                    }
                    forest.refresh_tree_paths(&id);
                    changed = true;
                }
                Ok(Reconciliation::Missing) => {
                    info!(node_id = %id, "Pruning note whose file record no longer exists");
                    forest.remove(&id);
                    changed = true;
                }
                Err(e) => {
                    warn!(node_id = %id, "Failed to reconcile note: {}", e);
                }
            }
        }
        changed
    }

    /// Look up one node (with its subtree)
    pub fn find_node(&self, node_id: &str) -> Result<TreeNode, ApiError> {
        self.load()?
            .snapshot(node_id)
            .ok_or_else(|| ApiError::NodeNotFound(node_id.to_string()))
    }

    /// Look up the node backed by `path` (external mode)
    pub fn find_by_path(&self, path: &Path) -> Result<Option<TreeNode>, ApiError> {
        let forest = self.load()?;
        Ok(forest
            .find_by_external_path(path)
            .and_then(|r| forest.snapshot(&r.meta.id)))
    }

    fn resolve_parent(&self, forest: &Forest, parent_id: Option<&str>) -> Result<Option<NodeId>, ApiError> {
        let Some(pid) = parent_id else {
            return Ok(None);
        };
        let problem = match forest.get(pid) {
            Some(record) if record.is_folder() => return Ok(Some(pid.to_string())),
            Some(_) => ApiError::InvalidParent(pid.to_string()),
            None => ApiError::NodeNotFound(pid.to_string()),
        };
        match self.parent_policy {
            ParentPolicy::Reject => Err(problem),
            ParentPolicy::Root => {
                warn!("{}; inserting at top level", problem);
                Ok(None)
            }
        }
    }

    fn create_node(
        &self,
        node_type: NodeType,
        name: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<TreeNode, ApiError> {
        let _guard = self.write_lock.lock();
        let name = sanitize_name(name)?;
        let mut forest = self.load()?;
        let parent = self.resolve_parent(&forest, parent_id)?;

        let entry = {
            let siblings = forest.child_names(parent.as_deref());
            let placement = Placement {
                parent: parent.as_deref().and_then(|p| forest.get(p)).map(|r| &r.meta),
                siblings: &siblings,
            };
            match node_type {
                NodeType::Folder => self.backing.create_folder(&placement, &name)?,
                NodeType::File => self.backing.create_note(&placement, &name, content)?,
            }
        };

        let mut meta = NodeMeta::new(new_node_id(), String::new());
        entry.apply(&mut meta);
        let id = meta.id.clone();
        let record = match node_type {
            NodeType::Folder => NodeRecord::folder(meta),
            NodeType::File => NodeRecord::file(meta),
        };
        forest.insert(parent.as_deref(), record, None)?;
        forest.refresh_tree_paths(&id);
        self.save(&forest)?;

        let node = forest
            .snapshot(&id)
            .ok_or_else(|| ApiError::NodeNotFound(id.clone()))?;
        info!(node_id = %id, tree_path = %node.meta.tree_path, "Created {}", node_type);
        Ok(node)
    }

    pub fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<TreeNode, ApiError> {
        self.create_node(NodeType::Folder, name, "", parent_id)
    }

    pub fn create_note(
        &self,
        name: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<TreeNode, ApiError> {
        self.create_node(NodeType::File, name, content, parent_id)
    }

    /// Import a file from disk as a new note named after its stem
    pub fn upload_note(&self, source: &Path, parent_id: Option<&str>) -> Result<TreeNode, ApiError> {
        let content = std::fs::read_to_string(source).map_err(|e| ApiError::io(source, e))?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ApiError::InvalidOperation(format!("cannot derive a note name from {}", source.display()))
            })?;
        self.create_node(NodeType::File, &ensure_note_extension(stem), &content, parent_id)
    }

    fn require_file<'a>(forest: &'a Forest, node_id: &str) -> Result<&'a NodeRecord, ApiError> {
        let record = forest
            .get(node_id)
            .ok_or_else(|| ApiError::NodeNotFound(node_id.to_string()))?;
        if record.is_folder() {
            return Err(ApiError::InvalidOperation(format!("{} is not a note", node_id)));
        }
        if record.meta.external_path.is_none() && record.meta.file_id.is_none() {
            return Err(ApiError::InvalidOperation(format!(
                "note {} has no backing reference",
                node_id
            )));
        }
        Ok(record)
    }

    pub fn read_note(&self, node_id: &str) -> Result<String, ApiError> {
        let forest = self.load()?;
        let record = Self::require_file(&forest, node_id)?;
        self.backing.read_note(&record.meta)
    }

    /// Rewrite a note's content and bump its `updated_at`
    pub fn update_note(&self, node_id: &str, content: &str) -> Result<(), ApiError> {
        let _guard = self.write_lock.lock();
        let mut forest = self.load()?;
        let record = Self::require_file(&forest, node_id)?;
        self.backing.write_note(&record.meta, content)?;
        if let Some(record) = forest.get_mut(node_id) {
            record.meta.touch();
        }
        self.save(&forest)?;
        debug!(node_id = %node_id, bytes = content.len(), "Updated note");
        Ok(())
    }

    /// Delete a node; folders cascade to every descendant.
    ///
    /// Failures deleting descendants are logged and skipped; a failure on the
    /// node itself aborts without touching the persisted tree.
    pub fn delete_node(&self, node_id: &str) -> Result<(), ApiError> {
        let _guard = self.write_lock.lock();
        let mut forest = self.load()?;
        let record = forest
            .get(node_id)
            .ok_or_else(|| ApiError::NodeNotFound(node_id.to_string()))?;

        if record.is_folder() {
            for child_id in forest.descendants(node_id) {
                let Some(child) = forest.get(&child_id) else {
                    continue;
                };
                if child.is_folder() {
                    continue;
                }
                if let Err(e) = self.backing.delete_note(&child.meta) {
                    warn!(node_id = %child_id, "Failed to delete descendant note: {}", e);
                }
            }
            self.backing.delete_folder(&record.meta)?;
        } else {
            self.backing.delete_note(&record.meta)?;
        }

        forest.remove(node_id);
        self.save(&forest)?;
        info!(node_id = %node_id, "Deleted node");
        Ok(())
    }

    /// Rename a node in place. Files always carry the note extension.
    pub fn rename_node(&self, node_id: &str, new_name: &str) -> Result<TreeNode, ApiError> {
        let _guard = self.write_lock.lock();
        let new_name = sanitize_name(new_name)?;
        let mut forest = self.load()?;
        let record = forest
            .get(node_id)
            .ok_or_else(|| ApiError::NodeNotFound(node_id.to_string()))?;
        let node_type = record.node_type();
        let old_path = record.meta.external_path.clone();

        let entry = self.backing.rename(&record.meta, node_type, &new_name)?;
        let new_path = entry.external_path.clone();
        if let Some(record) = forest.get_mut(node_id) {
            entry.apply(&mut record.meta);
            record.meta.touch();
        }
        if let (Some(from), Some(to)) = (old_path, new_path) {
            if from != to {
                forest.rebase_external_paths(node_id, &from, &to);
            }
        }
        forest.refresh_tree_paths(node_id);
        self.save(&forest)?;

        let node = forest
            .snapshot(node_id)
            .ok_or_else(|| ApiError::NodeNotFound(node_id.to_string()))?;
        info!(node_id = %node_id, name = %node.meta.name, "Renamed node");
        Ok(node)
    }

    /// Move `source_id` before, after or inside `target_id`.
    ///
    /// Returns `false` without persisting anything when either node is
    /// unknown, the move would nest under a file, the target lies inside
    /// the source's subtree, or the backing move fails.
    pub fn move_node(
        &self,
        source_id: &str,
        target_id: &str,
        position: MovePosition,
    ) -> Result<bool, ApiError> {
        let _guard = self.write_lock.lock();
        let mut forest = self.load()?;

        let (Some(source), Some(target)) = (forest.get(source_id), forest.get(target_id)) else {
            warn!(source = %source_id, target = %target_id, "Move rejected: node not found");
            return Ok(false);
        };
        if position == MovePosition::Inside && !target.is_folder() {
            warn!(source = %source_id, target = %target_id, "Move rejected: target is not a folder");
            return Ok(false);
        }
        if source_id == target_id || forest.is_ancestor(source_id, target_id) {
            warn!(source = %source_id, target = %target_id, "Move rejected: target is inside source");
            return Ok(false);
        }

        let new_parent = match position {
            MovePosition::Inside => Some(target_id.to_string()),
            MovePosition::Before | MovePosition::After => target.parent.clone(),
        };

        if new_parent != source.parent {
            let source_meta = source.meta.clone();
            let siblings = forest.child_names(new_parent.as_deref());
            let placement = Placement {
                parent: new_parent.as_deref().and_then(|p| forest.get(p)).map(|r| &r.meta),
                siblings: &siblings,
            };
            let entry = match self.backing.relocate(&source_meta, &placement) {
                Ok(entry) => entry,
                Err(e) => {
                    error!(source = %source_id, "Move aborted, backing move failed: {}", e);
                    return Ok(false);
                }
            };
            let new_path = entry.external_path.clone();
            if let Some(record) = forest.get_mut(source_id) {
                entry.apply(&mut record.meta);
            }
            if let (Some(from), Some(to)) = (source_meta.external_path, new_path) {
                if from != to {
                    forest.rebase_external_paths(source_id, &from, &to);
                }
            }
        }

        forest.detach(source_id);
        let index = match position {
            MovePosition::Inside => None,
            MovePosition::Before => forest.index_in_parent(target_id),
            MovePosition::After => forest.index_in_parent(target_id).map(|i| i + 1),
        };
        if let Err(e) = forest.attach(source_id, new_parent.as_deref(), index) {
            error!(source = %source_id, "Move aborted: {}", e);
            return Ok(false);
        }
        forest.refresh_tree_paths(source_id);
        self.save(&forest)?;

        info!(source = %source_id, target = %target_id, ?position, "Moved node");
        Ok(true)
    }

    /// Reorder every level (folders first) and remember the order in settings
    pub fn sort_all_levels(&self, sort_type: SortType) -> Result<(), ApiError> {
        let _guard = self.write_lock.lock();
        let mut forest = self.load()?;
        forest.sort_levels(|a, b| sort_type.compare(a, b));
        self.save(&forest)?;

        let mut settings = self.settings();
        settings.sort_type = sort_type;
        store::save_settings(self.records.as_ref(), &settings)?;
        debug!(sort = %sort_type, nodes = forest.len(), "Sorted notes tree");
        Ok(())
    }

    /// Flip a folder's `expanded` flag; silently ignores unknown ids and files
    pub fn toggle_expanded(&self, node_id: &str) -> Result<(), ApiError> {
        self.toggle_flag(node_id, |kind| match kind {
            NodeKind::Folder { expanded, .. } => {
                *expanded = !*expanded;
                true
            }
            NodeKind::File { .. } => false,
        })
    }

    /// Flip a file's `is_starred` flag; silently ignores unknown ids and folders
    pub fn toggle_starred(&self, node_id: &str) -> Result<(), ApiError> {
        self.toggle_flag(node_id, |kind| match kind {
            NodeKind::File { is_starred } => {
                *is_starred = !*is_starred;
                true
            }
            NodeKind::Folder { .. } => false,
        })
    }

    fn toggle_flag<F>(&self, node_id: &str, flip: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut NodeKind) -> bool,
    {
        let _guard = self.write_lock.lock();
        let mut forest = self.load()?;
        let Some(record) = forest.get_mut(node_id) else {
            debug!(node_id = %node_id, "Toggle ignored: node not found");
            return Ok(());
        };
        if !flip(&mut record.kind) {
            debug!(node_id = %node_id, "Toggle ignored: flag not supported for node type");
            return Ok(());
        }
        self.save(&forest)
    }
}
