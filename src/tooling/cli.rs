//! CLI Tooling
//!
//! Command-line interface over `NotesTreeStore`. Every command opens the
//! store from configuration, runs one operation, and renders the result as
//! text or JSON.

use crate::config::{ConfigLoader, NotesConfig};
use crate::error::ApiError;
use crate::notes::NotesTreeStore;
use crate::tooling::format::{
    format_node_summary, format_node_table, format_section_heading, format_tree_text,
};
use crate::tree::{MovePosition, SortType, TreeNode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Notes tree CLI - hierarchical notes kept in sync with their backing storage
#[derive(Parser)]
#[command(name = "notes-tree")]
#[command(about = "Hierarchical notes tree backed by a notes directory or a managed content store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the notes tree
    Tree {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List every node as a table
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create a folder
    Mkdir {
        name: String,
        /// Parent folder id (top level when omitted)
        #[arg(long)]
        parent: Option<String>,
    },
    /// Create a note
    New {
        name: String,
        /// Parent folder id (top level when omitted)
        #[arg(long)]
        parent: Option<String>,
        /// Initial content
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Import a file from disk as a note
    Upload {
        path: PathBuf,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Print a note's content
    Show { id: String },
    /// Replace a note's content
    Edit {
        id: String,
        #[arg(long)]
        content: String,
    },
    /// Delete a node (folders delete recursively)
    Rm {
        id: String,
        /// Skip confirmation for non-empty folders
        #[arg(long)]
        yes: bool,
    },
    /// Rename a node
    Rename { id: String, name: String },
    /// Move a node before, after or inside another node
    Mv {
        source: String,
        target: String,
        /// before, after or inside
        #[arg(long, default_value = "inside")]
        position: MovePosition,
    },
    /// Sort every level of the tree
    Sort {
        /// sort_a2z, sort_z2a, sort_updated_desc, sort_updated_asc, sort_created_desc, sort_created_asc
        sort_type: SortType,
    },
    /// Toggle a note's starred flag
    Star { id: String },
    /// Toggle a folder's expanded flag
    Expand { id: String },
    /// Rebuild the tree from the notes directory (external mode)
    Sync,
    /// Print the resolved configuration
    Config,
}

/// CLI execution context: resolved config plus the opened store
pub struct CliContext {
    config: NotesConfig,
    store: NotesTreeStore,
}

impl CliContext {
    /// Load configuration and open the store
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_with_override(config_path.as_deref())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Self::from_config(config)
    }

    pub fn from_config(config: NotesConfig) -> Result<Self, ApiError> {
        let store = NotesTreeStore::open(&config)?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    pub fn store(&self) -> &NotesTreeStore {
        &self.store
    }

    /// Run one command and return its rendered output
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Tree { format } => {
                let tree = self.store.get_tree();
                if format == "json" {
                    return to_json(&tree);
                }
                let heading = format!("Notes ({} mode)", self.store.mode());
                Ok(format!(
                    "{}\n\n{}",
                    format_section_heading(&heading),
                    format_tree_text(&tree)
                ))
            }
            Commands::List { format } => {
                let tree = self.store.get_tree();
                if format == "json" {
                    return to_json(&tree);
                }
                Ok(format_node_table(&tree))
            }
            Commands::Mkdir { name, parent } => {
                let node = self.store.create_folder(name, parent.as_deref())?;
                Ok(format!("Created {}", format_node_summary(&node)))
            }
            Commands::New {
                name,
                parent,
                content,
            } => {
                let node = self.store.create_note(name, content, parent.as_deref())?;
                Ok(format!("Created {}", format_node_summary(&node)))
            }
            Commands::Upload { path, parent } => {
                let node = self.store.upload_note(path, parent.as_deref())?;
                Ok(format!("Imported {}", format_node_summary(&node)))
            }
            Commands::Show { id } => self.store.read_note(id),
            Commands::Edit { id, content } => {
                self.store.update_note(id, content)?;
                Ok(format!("Updated note {}", id))
            }
            Commands::Rm { id, yes } => self.handle_remove(id, *yes),
            Commands::Rename { id, name } => {
                let node = self.store.rename_node(id, name)?;
                Ok(format!("Renamed to {}", format_node_summary(&node)))
            }
            Commands::Mv {
                source,
                target,
                position,
            } => {
                if self.store.move_node(source, target, *position)? {
                    let node = self.store.find_node(source)?;
                    Ok(format!("Moved {}", format_node_summary(&node)))
                } else {
                    Err(ApiError::InvalidOperation(format!(
                        "cannot move {} {:?} {}",
                        source, position, target
                    )))
                }
            }
            Commands::Sort { sort_type } => {
                self.store.sort_all_levels(*sort_type)?;
                Ok(format!("Sorted notes tree by {}", sort_type))
            }
            Commands::Star { id } => {
                self.store.toggle_starred(id)?;
                Ok(format!("Toggled star on {}", id))
            }
            Commands::Expand { id } => {
                self.store.toggle_expanded(id)?;
                Ok(format!("Toggled expansion of {}", id))
            }
            Commands::Sync => {
                let tree = self.store.sync_from_disk()?;
                Ok(format!("Synced {} top-level entries from disk", tree.len()))
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to serialize config: {}", e))),
        }
    }

    fn handle_remove(&self, id: &str, yes: bool) -> Result<String, ApiError> {
        let node = self.store.find_node(id)?;
        if !yes && !node.children().is_empty() {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Delete folder '{}' and everything inside it?",
                    node.meta.tree_path
                ))
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;

            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }
        self.store.delete_node(id)?;
        Ok(format!("Deleted {}", format_node_summary(&node)))
    }
}

fn to_json(tree: &[TreeNode]) -> Result<String, ApiError> {
    serde_json::to_string_pretty(tree).map_err(|e| ApiError::Storage(e.into()))
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Tree { .. } => "tree",
        Commands::List { .. } => "list",
        Commands::Mkdir { .. } => "mkdir",
        Commands::New { .. } => "new",
        Commands::Upload { .. } => "upload",
        Commands::Show { .. } => "show",
        Commands::Edit { .. } => "edit",
        Commands::Rm { .. } => "rm",
        Commands::Rename { .. } => "rename",
        Commands::Mv { .. } => "mv",
        Commands::Sort { .. } => "sort",
        Commands::Star { .. } => "star",
        Commands::Expand { .. } => "expand",
        Commands::Sync => "sync",
        Commands::Config => "config",
    }
}
