//! Load and merge the configuration without generating anything

use colored::*;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

use crate::loader;

pub fn run(config_path: Option<&Path>, root: &Path, quiet: bool) -> Result<()> {
    let root = expand(root);
    let config = loader::load(&root, config_path).context("configuration is invalid")?;

    if !quiet {
        println!("  {} configuration is valid", "✓".green());
        if let Some(project) = &config.project {
            println!("  project: {}", project.name);
        }
        println!(
            "  {} command(s), {} rule(s), {} mcp server(s), {} variable(s)",
            config.commands.len(),
            config.rules.len(),
            config.mcp_servers.len(),
            config.variables.len()
        );
    }
    Ok(())
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).unwrap_or_else(|_| raw.clone());
    PathBuf::from(expanded.as_ref())
}
