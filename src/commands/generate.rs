//! Run the generation pipeline and print the report

use colored::*;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::Shell;
use crate::envfile;
use crate::error::Error;
use crate::generate::{self, GenerateOptions};
use crate::loader;
use crate::registry::RuleMode;
use crate::resolver::Environment;
use crate::workspace::{DiskWorkspace, DryRunWorkspace, Workspace};

#[allow(clippy::too_many_arguments)]
pub fn run(
    agents: Vec<String>,
    config_path: Option<&Path>,
    root: &Path,
    output: Option<&Path>,
    rules_mode: RuleMode,
    shell: Option<Shell>,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let root = expand(root);
    let config = loader::load(&root, config_path).context("failed to load configuration")?;

    let output_root = output
        .map(expand)
        .or_else(|| config.project.as_ref().and_then(|p| p.dir.clone()))
        .unwrap_or_else(|| root.clone());

    let env = Environment::capture(envfile::load(&root.join(".env")));
    let shell = Shell::resolve(shell);

    let opts = GenerateOptions {
        agents,
        rules_mode,
        shell: shell.as_str().to_string(),
        source_root: root,
        root_display: output_root.display().to_string(),
    };

    let mut ws: Box<dyn Workspace> = if dry_run {
        Box::new(DryRunWorkspace::new(&output_root))
    } else {
        Box::new(DiskWorkspace::new(&output_root))
    };
    let report = generate::run(&config, &opts, &env, ws.as_mut())?;

    if !quiet {
        if dry_run {
            println!("  {} dry run, no files written", "⚠".yellow());
        }
        for path in &report.written {
            println!("  {} {path}", "✓".green());
        }
        for path in &report.conflicts {
            let conflict = Error::ManualEditConflict(PathBuf::from(path));
            println!("  {} skipped: {conflict}", "⚠".yellow());
        }
        for failure in &report.failures {
            println!("  {} {}: {}", "✗".red(), failure.scope, failure.error);
        }
        println!();
        println!(
            "{} written, {} skipped, {} failed",
            report.written.len(),
            report.conflicts.len(),
            report.failures.len()
        );
    }

    if !report.is_clean() {
        eyre::bail!("generation completed with {} failure(s)", report.failures.len());
    }
    Ok(())
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).unwrap_or_else(|_| raw.clone());
    PathBuf::from(expanded.as_ref())
}
