//! UI preferences persisted apart from the tree record.

use crate::tree::SortType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesSettings {
    /// Last order applied with `sort_all_levels`
    #[serde(default)]
    pub sort_type: SortType,
}
