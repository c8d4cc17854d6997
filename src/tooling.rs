//! Tooling & Integration Layer
//!
//! CLI front end and text rendering for the notes tree.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
