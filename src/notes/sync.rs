//! Rebuild the forest from the backing directory structure (external mode).

use super::NotesTreeStore;
use crate::backing::ScannedEntry;
use crate::error::ApiError;
use crate::tree::{Forest, NodeKind, NodeMeta, NodeRecord, NodeType, TreeNode};
use crate::types::new_node_id;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn file_times(path: &Path) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let modified = meta.modified().ok().map(DateTime::<Utc>::from);
            let created = meta.created().ok().map(DateTime::<Utc>::from).or(modified);
            (created, modified)
        }
        Err(_) => (None, None),
    }
}

impl NotesTreeStore {
    /// Replace the forest with what is on disk under the notes root.
    ///
    /// Nodes whose backing path still exists keep their id, timestamps and
    /// UI flags; new entries get fresh ids; vanished entries are dropped.
    /// Each level is ordered by the saved sort preference.
    pub fn sync_from_disk(&self) -> Result<Vec<TreeNode>, ApiError> {
        let _guard = self.write_lock.lock();
        let scanned = self.backing.scan()?;

        let previous = self.load().unwrap_or_else(|e| {
            warn!("Previous notes tree unreadable, rebuilding from scratch: {}", e);
            Forest::new()
        });
        let known: HashMap<PathBuf, &NodeRecord> = previous
            .preorder()
            .into_iter()
            .filter_map(|r| r.meta.external_path.clone().map(|p| (p, r)))
            .collect();

        let mut forest = Forest::new();
        let mut reused = 0usize;
        for entry in &scanned {
            Self::merge_entry(&mut forest, None, entry, &known, &mut reused)?;
        }

        let sort_type = self.settings().sort_type;
        forest.sort_levels(|a, b| sort_type.compare(a, b));
        let roots = forest.roots().to_vec();
        for root in roots {
            forest.refresh_tree_paths(&root);
        }
        self.save(&forest)?;

        info!(
            nodes = forest.len(),
            reused,
            dropped = previous.len().saturating_sub(reused),
            "Synced notes tree from disk"
        );
        Ok(forest.to_nodes())
    }

    fn merge_entry(
        forest: &mut Forest,
        parent: Option<&str>,
        entry: &ScannedEntry,
        known: &HashMap<PathBuf, &NodeRecord>,
        reused: &mut usize,
    ) -> Result<(), ApiError> {
        let existing = known
            .get(&entry.path)
            .filter(|r| r.node_type() == entry.node_type);

        let mut record = match existing {
            Some(previous) => {
                *reused += 1;
                NodeRecord {
                    meta: previous.meta.clone(),
                    kind: match &previous.kind {
                        NodeKind::Folder { expanded, .. } => NodeKind::Folder {
                            children: Vec::new(),
                            expanded: *expanded,
                        },
                        NodeKind::File { is_starred } => NodeKind::File {
                            is_starred: *is_starred,
                        },
                    },
                    parent: None,
                }
            }
            None => {
                let mut meta = NodeMeta::new(new_node_id(), entry.name.clone());
                let (created, modified) = file_times(&entry.path);
                meta.created_at = created.or(meta.created_at);
                meta.updated_at = modified.or(meta.updated_at);
                match entry.node_type {
                    NodeType::Folder => NodeRecord::folder(meta),
                    NodeType::File => NodeRecord::file(meta),
                }
            }
        };
        record.meta.name = entry.name.clone();
        record.meta.external_path = Some(entry.path.clone());
        record.meta.file_id = None;

        let id = record.meta.id.clone();
        forest.insert(parent, record, None)?;
        for child in &entry.children {
            Self::merge_entry(forest, Some(&id), child, known, reused)?;
        }
        Ok(())
    }
}
