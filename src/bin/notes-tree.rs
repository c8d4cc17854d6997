//! Notes Tree CLI Binary
//!
//! Command-line interface for the hierarchical notes tree.

use anyhow::Context;
use clap::Parser;
use notes_tree::config::{ConfigLoader, NotesConfig};
use notes_tree::logging::init_logging;
use notes_tree::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut config = ConfigLoader::load_with_override(cli.config.as_deref())
        .context("loading configuration")?;
    apply_logging_overrides(cli, &mut config);
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let context = CliContext::from_config(config).context("opening notes tree")?;
    Ok(context.execute(&cli.command)?)
}

/// CLI flags win over the logging section of the config
fn apply_logging_overrides(cli: &Cli, config: &mut NotesConfig) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
}
