//! Sort orders for the notes tree.

use crate::tree::node::NodeRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Ordering applied within each level of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortType {
    #[default]
    #[serde(rename = "sort_a2z")]
    NameAsc,
    #[serde(rename = "sort_z2a")]
    NameDesc,
    #[serde(rename = "sort_updated_desc")]
    UpdatedDesc,
    #[serde(rename = "sort_updated_asc")]
    UpdatedAsc,
    #[serde(rename = "sort_created_desc")]
    CreatedDesc,
    #[serde(rename = "sort_created_asc")]
    CreatedAsc,
}

impl SortType {
    pub const ALL: [SortType; 6] = [
        SortType::NameAsc,
        SortType::NameDesc,
        SortType::UpdatedDesc,
        SortType::UpdatedAsc,
        SortType::CreatedDesc,
        SortType::CreatedAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::NameAsc => "sort_a2z",
            SortType::NameDesc => "sort_z2a",
            SortType::UpdatedDesc => "sort_updated_desc",
            SortType::UpdatedAsc => "sort_updated_asc",
            SortType::CreatedDesc => "sort_created_desc",
            SortType::CreatedAsc => "sort_created_asc",
        }
    }

    /// Compare two nodes of the same group under this order
    pub fn compare(&self, a: &NodeRecord, b: &NodeRecord) -> Ordering {
        match self {
            SortType::NameAsc => compare_names(&a.meta.name, &b.meta.name),
            SortType::NameDesc => compare_names(&b.meta.name, &a.meta.name),
            SortType::UpdatedDesc => updated_millis(b).cmp(&updated_millis(a)),
            SortType::UpdatedAsc => updated_millis(a).cmp(&updated_millis(b)),
            SortType::CreatedDesc => created_millis(b).cmp(&created_millis(a)),
            SortType::CreatedAsc => created_millis(a).cmp(&created_millis(b)),
        }
    }
}

impl std::fmt::Display for SortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown sort type '{}' (expected one of: {})",
                    s,
                    SortType::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

/// Collation key: canonical decomposition with combining marks dropped, lowercased.
///
/// "Été" and "ete" produce the same key.
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case- and accent-insensitive name comparison
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

// Missing timestamps count as the epoch.
fn updated_millis(record: &NodeRecord) -> i64 {
    record
        .meta
        .updated_at
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}

fn created_millis(record: &NodeRecord) -> i64 {
    record
        .meta
        .created_at
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}
