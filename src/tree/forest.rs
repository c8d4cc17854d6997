//! Arena-backed notes forest.
//!
//! Nodes live in a flat map keyed by id; structure is expressed through a
//! parent pointer on every record and an ordered child-id list on folders.
//! The top level is an ordered list of root ids. The nested `TreeNode` form
//! is only produced at the edges (persistence, API results).

use crate::error::{ApiError, StorageError};
use crate::tree::node::{NodeKind, NodeRecord, TreeNode, TreeNodeKind};
use crate::types::{NodeId, NOTES_TREE_KEY};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// Ordered forest of folder and file nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    nodes: HashMap<NodeId, NodeRecord>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the arena from the nested persisted form.
    ///
    /// Duplicate ids make the record corrupt.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Result<Self, StorageError> {
        let mut forest = Forest::new();
        for node in nodes {
            let id = forest.load_node(node, None)?;
            forest.roots.push(id);
        }
        Ok(forest)
    }

    fn load_node(&mut self, node: TreeNode, parent: Option<NodeId>) -> Result<NodeId, StorageError> {
        let id = node.meta.id.clone();
        if self.nodes.contains_key(&id) {
            return Err(StorageError::Corrupt {
                key: NOTES_TREE_KEY.to_string(),
                reason: format!("duplicate node id {}", id),
            });
        }

        let kind = match node.kind {
            TreeNodeKind::Folder { children, expanded } => {
                // Reserve the id before descending so children see it as taken.
                self.nodes.insert(
                    id.clone(),
                    NodeRecord {
                        meta: node.meta.clone(),
                        kind: NodeKind::Folder {
                            children: Vec::new(),
                            expanded,
                        },
                        parent: parent.clone(),
                    },
                );
                let mut child_ids = Vec::with_capacity(children.len());
                for child in children {
                    child_ids.push(self.load_node(child, Some(id.clone()))?);
                }
                NodeKind::Folder {
                    children: child_ids,
                    expanded,
                }
            }
            TreeNodeKind::File { is_starred } => NodeKind::File { is_starred },
        };

        self.nodes.insert(
            id.clone(),
            NodeRecord {
                meta: node.meta,
                kind,
                parent,
            },
        );
        Ok(id)
    }

    /// Nested form of the whole forest, in display order
    pub fn to_nodes(&self) -> Vec<TreeNode> {
        self.roots
            .iter()
            .filter_map(|id| self.snapshot(id))
            .collect()
    }

    /// Nested form of one subtree
    pub fn snapshot(&self, id: &str) -> Option<TreeNode> {
        let record = self.nodes.get(id)?;
        let kind = match &record.kind {
            NodeKind::Folder { children, expanded } => TreeNodeKind::Folder {
                children: children.iter().filter_map(|c| self.snapshot(c)).collect(),
                expanded: *expanded,
            },
            NodeKind::File { is_starred } => TreeNodeKind::File {
                is_starred: *is_starred,
            },
        };
        Some(TreeNode {
            meta: record.meta.clone(),
            kind,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Find a node by id
    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(id)
    }

    /// Find the parent of a node; `None` for top-level or unknown nodes
    pub fn parent_of(&self, id: &str) -> Option<&NodeRecord> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes.get(parent)
    }

    /// Ordered child ids of a folder, or the root list when `parent` is `None`
    pub fn children_of(&self, parent: Option<&str>) -> &[NodeId] {
        match parent {
            Some(pid) => self.nodes.get(pid).map(|r| r.children()).unwrap_or(&[]),
            None => &self.roots,
        }
    }

    /// Names of the entries directly under `parent` (or the top level)
    pub fn child_names(&self, parent: Option<&str>) -> Vec<String> {
        self.children_of(parent)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|r| r.meta.name.clone())
            .collect()
    }

    /// Depth-first, pre-order walk of the whole forest
    pub fn preorder(&self) -> Vec<&NodeRecord> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&NodeId> = self.roots.iter().rev().collect();
        while let Some(id) = stack.pop() {
            if let Some(record) = self.nodes.get(id) {
                out.push(record);
                stack.extend(record.children().iter().rev());
            }
        }
        out
    }

    /// Ids of every node below `id`, pre-order, excluding `id` itself
    pub fn descendants(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(record) = self.nodes.get(id) else {
            return out;
        };
        let mut stack: Vec<&NodeId> = record.children().iter().rev().collect();
        while let Some(child) = stack.pop() {
            if let Some(child_record) = self.nodes.get(child) {
                out.push(child.clone());
                stack.extend(child_record.children().iter().rev());
            }
        }
        out
    }

    /// First node in pre-order whose backing path equals `path`
    pub fn find_by_external_path(&self, path: &Path) -> Option<&NodeRecord> {
        self.preorder()
            .into_iter()
            .find(|r| r.meta.external_path.as_deref() == Some(path))
    }

    /// True when `candidate` is a strict ancestor of `node_id`
    pub fn is_ancestor(&self, candidate: &str, node_id: &str) -> bool {
        let mut current = self.nodes.get(node_id).and_then(|r| r.parent.as_deref());
        // Bounded walk: a corrupt parent chain must not loop forever.
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == candidate {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(parent).and_then(|r| r.parent.as_deref());
        }
        false
    }

    /// Position of a node within its parent's children (or the root list)
    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        let record = self.nodes.get(id)?;
        self.children_of(record.parent.as_deref())
            .iter()
            .position(|c| c == id)
    }

    /// Insert a new record under `parent` (or at the top level).
    ///
    /// `index` of `None` appends. The parent must be an existing folder.
    pub fn insert(
        &mut self,
        parent: Option<&str>,
        mut record: NodeRecord,
        index: Option<usize>,
    ) -> Result<(), ApiError> {
        let id = record.meta.id.clone();
        if self.nodes.contains_key(&id) {
            return Err(ApiError::InvalidOperation(format!(
                "node id {} already present",
                id
            )));
        }
        record.parent = parent.map(str::to_string);
        self.link(&id, parent, index)?;
        self.nodes.insert(id, record);
        Ok(())
    }

    /// Re-link a detached node under `parent` at `index`
    pub fn attach(&mut self, id: &str, parent: Option<&str>, index: Option<usize>) -> Result<(), ApiError> {
        if !self.nodes.contains_key(id) {
            return Err(ApiError::NodeNotFound(id.to_string()));
        }
        if let Some(pid) = parent {
            if pid == id || self.is_ancestor(id, pid) {
                return Err(ApiError::InvalidOperation(format!(
                    "cannot attach {} inside its own subtree",
                    id
                )));
            }
        }
        self.link(id, parent, index)?;
        if let Some(record) = self.nodes.get_mut(id) {
            record.parent = parent.map(str::to_string);
        }
        Ok(())
    }

    fn link(&mut self, id: &str, parent: Option<&str>, index: Option<usize>) -> Result<(), ApiError> {
        let list = match parent {
            Some(pid) => match self.nodes.get_mut(pid).map(|r| &mut r.kind) {
                Some(NodeKind::Folder { children, .. }) => children,
                _ => return Err(ApiError::InvalidParent(pid.to_string())),
            },
            None => &mut self.roots,
        };
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, id.to_string());
        Ok(())
    }

    /// Unlink a node from its parent (or the root list), keeping its subtree.
    ///
    /// Returns the former parent and index.
    pub fn detach(&mut self, id: &str) -> Option<(Option<NodeId>, usize)> {
        let parent = self.nodes.get(id)?.parent.clone();
        let list = match parent.as_deref() {
            Some(pid) => match self.nodes.get_mut(pid).map(|r| &mut r.kind) {
                Some(NodeKind::Folder { children, .. }) => children,
                _ => return None,
            },
            None => &mut self.roots,
        };
        let index = list.iter().position(|c| c == id)?;
        list.remove(index);
        if let Some(record) = self.nodes.get_mut(id) {
            record.parent = None;
        }
        Some((parent, index))
    }

    /// Remove a node and its whole subtree. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        let doomed = self.descendants(id);
        if self.detach(id).is_none() {
            return false;
        }
        for child in doomed {
            self.nodes.remove(&child);
        }
        self.nodes.remove(id);
        true
    }

    /// Display path built from ancestor names: `/A/B/note.md`
    pub fn compute_tree_path(&self, id: &str) -> String {
        let mut segments = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(record) = current {
            segments.push(record.meta.name.as_str());
            if segments.len() > self.nodes.len() {
                break;
            }
            current = record.parent.as_deref().and_then(|p| self.nodes.get(p));
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Recompute `tree_path` for a node and everything below it
    pub fn refresh_tree_paths(&mut self, id: &str) {
        let mut ids = vec![id.to_string()];
        ids.extend(self.descendants(id));
        for node_id in ids {
            let path = self.compute_tree_path(&node_id);
            if let Some(record) = self.nodes.get_mut(&node_id) {
                record.meta.tree_path = path;
            }
        }
    }

    /// Rewrite backing paths of a subtree after its directory moved from `from` to `to`
    pub fn rebase_external_paths(&mut self, id: &str, from: &Path, to: &Path) {
        let mut ids = vec![id.to_string()];
        ids.extend(self.descendants(id));
        for node_id in ids {
            if let Some(record) = self.nodes.get_mut(&node_id) {
                if let Some(current) = record.meta.external_path.as_ref() {
                    if let Ok(rest) = current.strip_prefix(from) {
                        record.meta.external_path = Some(if rest.as_os_str().is_empty() {
                            to.to_path_buf()
                        } else {
                            to.join(rest)
                        });
                    }
                }
            }
        }
    }

    /// Reorder every level: folders first, then files, each group by `compare`.
    ///
    /// Uses a stable sort, so entries that compare equal keep their order.
    pub fn sort_levels<F>(&mut self, mut compare: F)
    where
        F: FnMut(&NodeRecord, &NodeRecord) -> Ordering,
    {
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_ids(&mut roots, &mut compare);
        self.roots = roots;

        let folder_ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|r| r.is_folder())
            .map(|r| r.meta.id.clone())
            .collect();
        for id in folder_ids {
            let mut children = match self.nodes.get_mut(&id).map(|r| &mut r.kind) {
                Some(NodeKind::Folder { children, .. }) => std::mem::take(children),
                _ => continue,
            };
            self.sort_ids(&mut children, &mut compare);
            if let Some(NodeKind::Folder { children: slot, .. }) =
                self.nodes.get_mut(&id).map(|r| &mut r.kind)
            {
                *slot = children;
            }
        }
    }

    fn sort_ids<F>(&self, ids: &mut [NodeId], compare: &mut F)
    where
        F: FnMut(&NodeRecord, &NodeRecord) -> Ordering,
    {
        ids.sort_by(|a, b| match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(ra), Some(rb)) => rb
                .is_folder()
                .cmp(&ra.is_folder())
                .then_with(|| compare(ra, rb)),
            _ => Ordering::Equal,
        });
    }
}
