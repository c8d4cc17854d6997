//! Notes tree structure: node types, the arena forest, naming and ordering.

pub mod forest;
pub mod naming;
pub mod node;
pub mod sort;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use forest::Forest;
pub use node::{NodeKind, NodeMeta, NodeRecord, NodeType, TreeNode, TreeNodeKind};
pub use sort::SortType;

/// Where a moved node lands relative to the target node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePosition {
    Before,
    After,
    Inside,
}

impl FromStr for MovePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(MovePosition::Before),
            "after" => Ok(MovePosition::After),
            "inside" => Ok(MovePosition::Inside),
            other => Err(format!(
                "invalid position '{}' (must be 'before', 'after', or 'inside')",
                other
            )),
        }
    }
}
