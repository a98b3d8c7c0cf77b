//! Agent spec registry
//!
//! A static, read-only catalog of the downstream agents charlie can target.
//! Each entry describes where that agent expects its files, which frontmatter
//! dialect it parses, which rule modes it supports, and the literal token it
//! uses for user input in command files. Different agents parse their own
//! command files differently, so the user-input token is agent-specific.

use clap::ValueEnum;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// How rule definitions are laid out for an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleMode {
    /// One file concatenating every rule
    Merged,
    /// One file per rule
    Separate,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMode::Merged => write!(f, "merged"),
            RuleMode::Separate => write!(f, "separate"),
        }
    }
}

/// Frontmatter dialect for generated command and rule files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Markdown body preceded by a `---`-delimited YAML block
    YamlMarkdown,
    /// A single TOML document, prompt included as a key
    Toml,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::YamlMarkdown => write!(f, "yaml-markdown"),
            Dialect::Toml => write!(f, "toml"),
        }
    }
}

/// Immutable capability record for one target agent
#[derive(Debug, Clone, Copy)]
pub struct AgentSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Agent base directory, relative to the output root
    pub dir: &'static str,
    pub commands_dir: &'static str,
    pub commands_extension: &'static str,
    pub rules_dir: &'static str,
    pub rules_extension: &'static str,
    /// Merged-mode rules file
    pub rules_file: &'static str,
    pub mcp_file: &'static str,
    pub dialect: Dialect,
    pub rule_modes: &'static [RuleMode],
    /// Literal substituted for the `{{user_input}}` placeholder
    pub arg_placeholder: &'static str,
}

impl AgentSpec {
    pub fn supports_rule_mode(&self, mode: RuleMode) -> bool {
        self.rule_modes.contains(&mode)
    }

    pub fn assets_dir(&self) -> String {
        format!("{}/assets", self.dir)
    }
}

const BOTH_MODES: &[RuleMode] = &[RuleMode::Merged, RuleMode::Separate];
const MERGED_ONLY: &[RuleMode] = &[RuleMode::Merged];
const SEPARATE_ONLY: &[RuleMode] = &[RuleMode::Separate];

static AGENTS: &[AgentSpec] = &[
    AgentSpec {
        id: "claude",
        display_name: "Claude Code",
        dir: ".claude",
        commands_dir: ".claude/commands",
        commands_extension: "md",
        rules_dir: ".claude/rules",
        rules_extension: "md",
        rules_file: "CLAUDE.md",
        mcp_file: ".mcp.json",
        dialect: Dialect::YamlMarkdown,
        rule_modes: BOTH_MODES,
        arg_placeholder: "$ARGUMENTS",
    },
    AgentSpec {
        id: "copilot",
        display_name: "GitHub Copilot",
        dir: ".github",
        commands_dir: ".github/prompts",
        commands_extension: "prompt.md",
        rules_dir: ".github/instructions",
        rules_extension: "md",
        rules_file: ".github/copilot-instructions.md",
        mcp_file: ".vscode/mcp.json",
        dialect: Dialect::YamlMarkdown,
        rule_modes: BOTH_MODES,
        arg_placeholder: "$ARGUMENTS",
    },
    AgentSpec {
        id: "cursor",
        display_name: "Cursor",
        dir: ".cursor",
        commands_dir: ".cursor/commands",
        commands_extension: "md",
        rules_dir: ".cursor/rules",
        rules_extension: "mdc",
        rules_file: ".cursorrules",
        mcp_file: ".cursor/mcp.json",
        dialect: Dialect::YamlMarkdown,
        rule_modes: SEPARATE_ONLY,
        arg_placeholder: "$ARGUMENTS",
    },
    AgentSpec {
        id: "gemini",
        display_name: "Gemini CLI",
        dir: ".gemini",
        commands_dir: ".gemini/commands",
        commands_extension: "toml",
        rules_dir: ".gemini/rules",
        rules_extension: "md",
        rules_file: "GEMINI.md",
        mcp_file: ".gemini/mcp.json",
        dialect: Dialect::Toml,
        rule_modes: MERGED_ONLY,
        arg_placeholder: "{{args}}",
    },
    AgentSpec {
        id: "opencode",
        display_name: "opencode",
        dir: ".opencode",
        commands_dir: ".opencode/command",
        commands_extension: "md",
        rules_dir: ".opencode/rules",
        rules_extension: "md",
        rules_file: "AGENTS.md",
        mcp_file: ".opencode/mcp.json",
        dialect: Dialect::YamlMarkdown,
        rule_modes: BOTH_MODES,
        arg_placeholder: "$ARGUMENTS",
    },
    AgentSpec {
        id: "qwen",
        display_name: "Qwen Code",
        dir: ".qwen",
        commands_dir: ".qwen/commands",
        commands_extension: "toml",
        rules_dir: ".qwen/rules",
        rules_extension: "md",
        rules_file: "QWEN.md",
        mcp_file: ".qwen/mcp.json",
        dialect: Dialect::Toml,
        rule_modes: MERGED_ONLY,
        arg_placeholder: "{{args}}",
    },
    AgentSpec {
        id: "windsurf",
        display_name: "Windsurf",
        dir: ".windsurf",
        commands_dir: ".windsurf/workflows",
        commands_extension: "md",
        rules_dir: ".windsurf/rules",
        rules_extension: "md",
        rules_file: ".windsurfrules",
        mcp_file: ".windsurf/mcp.json",
        dialect: Dialect::YamlMarkdown,
        rule_modes: BOTH_MODES,
        arg_placeholder: "$ARGUMENTS",
    },
];

static BY_ID: Lazy<BTreeMap<&'static str, &'static AgentSpec>> =
    Lazy::new(|| AGENTS.iter().map(|spec| (spec.id, spec)).collect());

/// Look up an agent by id
pub fn get(id: &str) -> Result<&'static AgentSpec> {
    BY_ID
        .get(id)
        .copied()
        .ok_or_else(|| Error::UnsupportedAgent(id.to_string()))
}

/// All registry entries, sorted by id
pub fn list() -> impl Iterator<Item = &'static AgentSpec> {
    BY_ID.values().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_agent() {
        let spec = get("claude").unwrap();
        assert_eq!(spec.display_name, "Claude Code");
        assert_eq!(spec.commands_dir, ".claude/commands");
        assert_eq!(spec.dialect, Dialect::YamlMarkdown);
    }

    #[test]
    fn test_get_unknown_agent() {
        let err = get("nonexistent").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAgent(ref id) if id == "nonexistent"));
    }

    #[test]
    fn test_list_is_sorted() {
        let ids: Vec<&str> = list().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(ids.contains(&"gemini"));
    }

    #[test]
    fn test_markdown_agents_use_arguments_token() {
        for spec in list().filter(|s| s.dialect == Dialect::YamlMarkdown) {
            assert_eq!(spec.arg_placeholder, "$ARGUMENTS", "agent {}", spec.id);
        }
    }

    #[test]
    fn test_toml_agents_use_args_token() {
        for spec in list().filter(|s| s.dialect == Dialect::Toml) {
            assert_eq!(spec.arg_placeholder, "{{args}}", "agent {}", spec.id);
        }
    }

    #[test]
    fn test_every_agent_supports_some_rule_mode() {
        for spec in list() {
            assert!(!spec.rule_modes.is_empty(), "agent {}", spec.id);
        }
    }
}
