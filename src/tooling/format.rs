//! Format notes trees and node listings as text.

use crate::tree::{NodeType, TreeNode, TreeNodeKind};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Render the forest as an indented tree
pub fn format_tree_text(nodes: &[TreeNode]) -> String {
    if nodes.is_empty() {
        return "(no notes)".to_string();
    }
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        render_node(&mut out, node, "", i + 1 == nodes.len());
    }
    out
}

fn render_node(out: &mut String, node: &TreeNode, prefix: &str, last: bool) {
    let branch = if last { "└── " } else { "├── " };
    let label = match &node.kind {
        TreeNodeKind::Folder { expanded, .. } => {
            let marker = if *expanded { "▾" } else { "▸" };
            format!("{} {}", marker, node.name().blue().bold())
        }
        TreeNodeKind::File { is_starred } => {
            if *is_starred {
                format!("{} {}", node.name(), "★".yellow())
            } else {
                node.name().to_string()
            }
        }
    };
    out.push_str(&format!(
        "{}{}{}  {}\n",
        prefix,
        branch,
        label,
        short_id(node.id()).dimmed()
    ));

    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        render_node(out, child, &child_prefix, i + 1 == children.len());
    }
}

/// Flat table of every node, pre-order
pub fn format_node_table(nodes: &[TreeNode]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Type", "Path", "Starred", "Updated"]);

    let mut stack: Vec<&TreeNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        let starred = match node.kind {
            TreeNodeKind::File { is_starred: true } => "yes",
            _ => "",
        };
        let updated = node
            .meta
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            short_id(node.id()).to_string(),
            node.node_type().to_string(),
            node.meta.tree_path.clone(),
            starred.to_string(),
            updated,
        ]);
        stack.extend(node.children().iter().rev());
    }
    table.to_string()
}

/// One-line summary of a single node
pub fn format_node_summary(node: &TreeNode) -> String {
    let kind = match node.node_type() {
        NodeType::Folder => "folder",
        NodeType::File => "note",
    };
    format!("{} {} ({})", kind, node.meta.tree_path, node.id())
}
