//! Tree node types: the nested wire form and the arena record form.

use crate::types::{FileId, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Folder,
    File,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Folder => write!(f, "folder"),
            NodeType::File => write!(f, "file"),
        }
    }
}

/// Fields shared by folders and files.
///
/// `external_path` and `file_id` are mutually exclusive: which one is set
/// depends on the storage mode the tree was built under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub tree_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NodeMeta {
    /// New metadata stamped with the current time
    pub fn new(id: NodeId, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            tree_path: String::new(),
            external_path: None,
            file_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Nested node as persisted and as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub meta: NodeMeta,
    #[serde(flatten)]
    pub kind: TreeNodeKind,
}

/// Type-specific part of a nested node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNodeKind {
    Folder {
        #[serde(default)]
        children: Vec<TreeNode>,
        #[serde(default)]
        expanded: bool,
    },
    File {
        #[serde(default, rename = "is_starred")]
        is_starred: bool,
    },
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            TreeNodeKind::Folder { .. } => NodeType::Folder,
            TreeNodeKind::File { .. } => NodeType::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.node_type() == NodeType::Folder
    }

    /// Children of a folder; files have none
    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            TreeNodeKind::Folder { children, .. } => children,
            TreeNodeKind::File { .. } => &[],
        }
    }
}

/// Arena record: one node with links expressed as ids
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub meta: NodeMeta,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// Type-specific part of an arena record
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Folder { children: Vec<NodeId>, expanded: bool },
    File { is_starred: bool },
}

impl NodeRecord {
    pub fn folder(meta: NodeMeta) -> Self {
        Self {
            meta,
            kind: NodeKind::Folder {
                children: Vec::new(),
                expanded: false,
            },
            parent: None,
        }
    }

    pub fn file(meta: NodeMeta) -> Self {
        Self {
            meta,
            kind: NodeKind::File { is_starred: false },
            parent: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Folder { .. } => NodeType::Folder,
            NodeKind::File { .. } => NodeType::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.node_type() == NodeType::Folder
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::File { .. } => &[],
        }
    }
}
