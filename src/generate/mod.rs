//! Generation pipeline
//!
//! Fans the loaded definition model out per agent: build a resolution context
//! from the agent spec, render commands, rules, and MCP config, and write
//! through the tracker. Load/merge problems abort before this module runs;
//! everything here is isolate-and-report: one agent's or one file's failure
//! never prevents sibling work, and the run concludes with an aggregate
//! report of writes, conflicts, and failures.

pub mod commands;
pub mod frontmatter;
pub mod mcp;
pub mod rules;

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::registry::{self, AgentSpec, RuleMode};
use crate::resolver::{Environment, ResolveContext};
use crate::schema::Config;
use crate::tracker::{Tracker, WriteOutcome};
use crate::workspace::Workspace;

/// Runtime preferences supplied by the CLI
pub struct GenerateOptions {
    pub agents: Vec<String>,
    pub rules_mode: RuleMode,
    /// Active `shell` discriminator value, e.g. `bash` or `powershell`
    pub shell: String,
    /// Project root holding `.charlie/` sources (for assets)
    pub source_root: PathBuf,
    /// Output root as written into the `{{root}}` placeholder
    pub root_display: String,
}

/// One isolated failure, scoped to the agent or file it occurred on
pub struct Failure {
    pub scope: String,
    pub error: Error,
}

/// Aggregate outcome of a run
#[derive(Default)]
pub struct RunReport {
    pub written: Vec<String>,
    pub conflicts: Vec<String>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, rel: String, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written.push(rel),
            WriteOutcome::Conflict => self.conflicts.push(rel),
        }
    }

    fn fail(&mut self, scope: impl Into<String>, error: Error) {
        let failure = Failure {
            scope: scope.into(),
            error,
        };
        log::warn!("{}: {}", failure.scope, failure.error);
        self.failures.push(failure);
    }
}

/// Run the full pipeline for every requested agent
pub fn run(
    config: &Config,
    opts: &GenerateOptions,
    env: &Environment,
    ws: &mut dyn Workspace,
) -> Result<RunReport> {
    let mut tracker = Tracker::load(ws)?;
    let mut report = RunReport::default();

    for agent_id in &opts.agents {
        let spec = match registry::get(agent_id) {
            Ok(spec) => spec,
            Err(e) => {
                report.fail(agent_id.clone(), e);
                continue;
            }
        };
        log::info!("generating for {}", spec.display_name);

        let ctx = build_context(spec, config, opts, env);
        generate_commands(config, spec, &ctx, &mut tracker, ws, &mut report);
        generate_rules(config, spec, opts.rules_mode, &ctx, &mut tracker, ws, &mut report);

        if !config.mcp_servers.is_empty() {
            match mcp::render_mcp(&config.mcp_servers) {
                Ok(document) => {
                    write_tracked(&mut tracker, ws, &mut report, spec.mcp_file.to_string(), document.as_bytes());
                }
                Err(e) => report.fail(format!("{}: {}", spec.id, spec.mcp_file), e),
            }
        }

        copy_assets(spec, &opts.source_root, &mut tracker, ws, &mut report);
    }

    tracker.save(ws)?;
    Ok(report)
}

fn build_context<'a>(
    spec: &AgentSpec,
    config: &'a Config,
    opts: &GenerateOptions,
    env: &'a Environment,
) -> ResolveContext<'a> {
    let mut tokens: IndexMap<String, String> = IndexMap::new();
    tokens.insert("user_input".to_string(), spec.arg_placeholder.to_string());
    tokens.insert("agent_name".to_string(), spec.display_name.to_string());
    if let Some(project) = &config.project {
        tokens.insert("project_name".to_string(), project.name.clone());
    }
    tokens.insert("root".to_string(), opts.root_display.clone());
    tokens.insert("agent_dir".to_string(), spec.dir.to_string());
    tokens.insert("commands_dir".to_string(), spec.commands_dir.to_string());
    tokens.insert("rules_dir".to_string(), spec.rules_dir.to_string());
    tokens.insert("assets_dir".to_string(), spec.assets_dir());

    let mut discriminators: IndexMap<String, String> = IndexMap::new();
    discriminators.insert("shell".to_string(), opts.shell.clone());
    discriminators.insert("os".to_string(), std::env::consts::OS.to_string());

    ResolveContext::new(tokens, &config.variables, env, discriminators)
}

fn generate_commands(
    config: &Config,
    spec: &AgentSpec,
    ctx: &ResolveContext,
    tracker: &mut Tracker,
    ws: &mut dyn Workspace,
    report: &mut RunReport,
) {
    for command in &config.commands {
        let rel = commands::command_path(command, config.namespace(), spec);
        match commands::render_command(command, spec, ctx) {
            Ok(content) => write_tracked(tracker, ws, report, rel, content.as_bytes()),
            Err(e) => report.fail(format!("{}: {rel}", spec.id), e),
        }
    }
}

fn generate_rules(
    config: &Config,
    spec: &AgentSpec,
    mode: RuleMode,
    ctx: &ResolveContext,
    tracker: &mut Tracker,
    ws: &mut dyn Workspace,
    report: &mut RunReport,
) {
    if config.rules.is_empty() {
        return;
    }
    if let Err(e) = rules::check_mode(spec, mode) {
        report.fail(spec.id, e);
        return;
    }

    match mode {
        RuleMode::Merged => {
            let project_name = config
                .project
                .as_ref()
                .map(|p| p.name.as_str())
                .unwrap_or("Development Guidelines");
            match rules::render_merged(&config.rules, project_name, ctx) {
                Ok(content) => {
                    write_tracked(tracker, ws, report, spec.rules_file.to_string(), content.as_bytes());
                }
                Err(e) => report.fail(format!("{}: {}", spec.id, spec.rules_file), e),
            }
        }
        RuleMode::Separate => {
            for rule in &config.rules {
                let rel = rules::rule_path(rule, config.namespace(), spec);
                match rules::render_separate(rule, spec, ctx) {
                    Ok(content) => write_tracked(tracker, ws, report, rel, content.as_bytes()),
                    Err(e) => report.fail(format!("{}: {rel}", spec.id), e),
                }
            }
        }
    }
}

/// Copy `.charlie/assets/**` into the agent's assets directory, tracked like
/// any other output
fn copy_assets(
    spec: &AgentSpec,
    source_root: &Path,
    tracker: &mut Tracker,
    ws: &mut dyn Workspace,
    report: &mut RunReport,
) {
    let assets_dir = source_root.join(".charlie").join("assets");
    if !assets_dir.is_dir() {
        return;
    }

    for entry in WalkDir::new(&assets_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(tail) = entry.path().strip_prefix(&assets_dir) else {
            continue;
        };
        let rel = format!("{}/{}", spec.assets_dir(), to_slash(tail));
        // raw bytes: assets are routinely images or archives, not text
        match std::fs::read(entry.path()) {
            Ok(content) => write_tracked(tracker, ws, report, rel, &content),
            Err(e) => report.fail(format!("{}: {rel}", spec.id), Error::Io(e)),
        }
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_tracked(
    tracker: &mut Tracker,
    ws: &mut dyn Workspace,
    report: &mut RunReport,
    rel: String,
    content: &[u8],
) {
    match tracker.write(ws, &rel, content) {
        Ok(outcome) => report.record(rel, outcome),
        Err(e) => report.fail(rel, e),
    }
}
