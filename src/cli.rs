use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::registry::RuleMode;

/// Active shell for discriminated replacements
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Powershell,
}

impl Shell {
    /// Resolve the effective shell.
    /// If the user specified one, use it. Otherwise pick by host OS.
    pub fn resolve(user_choice: Option<Shell>) -> Shell {
        match user_choice {
            Some(shell) => shell,
            None => {
                if cfg!(windows) {
                    Shell::Powershell
                } else {
                    Shell::Bash
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Powershell => "powershell",
        }
    }
}

#[derive(Parser)]
#[command(
    name = "charlie",
    about = "Describe AI-agent commands, rules, and MCP servers once; generate per-agent artifacts",
    version
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate artifacts for one or more agents
    Generate {
        /// Agent to generate for (repeatable)
        #[arg(short, long = "agent", value_name = "ID", required = true)]
        agents: Vec<String>,

        /// Explicit monolithic config file (default: discover in the project root)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root to load sources from
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output root (default: the project root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How rule definitions are laid out
        #[arg(long, value_enum, default_value_t = RuleMode::Merged)]
        rules_mode: RuleMode,

        /// Shell used for discriminated replacements (default: by host OS)
        #[arg(long, value_enum)]
        shell: Option<Shell>,

        /// Report what would be written without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// List supported agents
    Agents,

    /// Load and merge the configuration without generating anything
    Validate {
        /// Explicit monolithic config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Project root to load sources from
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_resolve_explicit() {
        assert_eq!(Shell::resolve(Some(Shell::Powershell)), Shell::Powershell);
    }

    #[test]
    fn test_shell_resolve_default_matches_host() {
        let shell = Shell::resolve(None);
        if cfg!(windows) {
            assert_eq!(shell, Shell::Powershell);
        } else {
            assert_eq!(shell, Shell::Bash);
        }
    }

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from(["charlie", "generate", "--agent", "claude", "--agent", "gemini"]).unwrap();
        match cli.command {
            Commands::Generate { agents, rules_mode, .. } => {
                assert_eq!(agents, vec!["claude", "gemini"]);
                assert_eq!(rules_mode, RuleMode::Merged);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_requires_agent() {
        assert!(Cli::try_parse_from(["charlie", "generate"]).is_err());
    }
}
