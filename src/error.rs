//! Error taxonomy for the load/resolve/generate pipeline
//!
//! Load-time errors abort the whole run before any file is touched.
//! Generation-time errors are scoped to one agent or one file and collected
//! into the run report instead of aborting sibling work.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which collection a definition belongs to, for duplicate reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Command,
    Rule,
    McpServer,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Command => write!(f, "command"),
            DefinitionKind::Rule => write!(f, "rule"),
            DefinitionKind::McpServer => write!(f, "mcp-server"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no configuration found in {0}: expected charlie.yaml, charlie.dist.yaml, or a .charlie/ directory")]
    ConfigNotFound(PathBuf),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("duplicate {kind} definition: {name}")]
    DuplicateDefinition { name: String, kind: DefinitionKind },

    #[error("unsupported agent: {0}")]
    UnsupportedAgent(String),

    #[error("unknown placeholder: {{{{{0}}}}}")]
    UnknownPlaceholder(String),

    #[error("no replacement option for discriminator {key} = {value}")]
    MissingDiscriminatorOption { key: String, value: String },

    #[error("environment variable not found: {0}")]
    EnvironmentVariableNotFound(String),

    #[error("agent {agent} does not support {mode} rules")]
    UnsupportedRuleMode { agent: String, mode: String },

    #[error("manually edited since last generation: {0}")]
    ManualEditConflict(PathBuf),

    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_placeholder_names_token() {
        let err = Error::UnknownPlaceholder("frobnicate".to_string());
        assert_eq!(err.to_string(), "unknown placeholder: {{frobnicate}}");
    }

    #[test]
    fn test_duplicate_definition_display() {
        let err = Error::DuplicateDefinition {
            name: "deploy".to_string(),
            kind: DefinitionKind::Command,
        };
        assert_eq!(err.to_string(), "duplicate command definition: deploy");
    }

    #[test]
    fn test_missing_discriminator_option_display() {
        let err = Error::MissingDiscriminatorOption {
            key: "shell".to_string(),
            value: "zsh".to_string(),
        };
        assert_eq!(err.to_string(), "no replacement option for discriminator shell = zsh");
    }
}
