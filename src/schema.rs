//! Definition model
//!
//! The entities a charlie project describes: project metadata, variables,
//! commands, rules, and MCP servers. Instances are built fresh per invocation
//! by the loader; nothing here persists across runs.
//!
//! Metadata fields are opaque pass-through data. Field names keep their exact
//! case and separator style, values round-trip through YAML and TOML without
//! losing insertion order.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Project metadata from the monolithic config
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Prefix for generated identifiers, e.g. `myapp-deploy.md`
    #[serde(default)]
    pub namespace: Option<String>,

    /// Project root; used as the default output root
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Where a variable's value comes from. Resolved lazily, on first reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VariableDef {
    /// Environment variable to read; defaults to the variable's own name
    #[serde(default)]
    pub env: Option<String>,

    /// Literal fallback when the environment has no value
    #[serde(default)]
    pub default: Option<String>,
}

/// Closed value variant for pass-through metadata
///
/// Deliberately small: just enough to round-trip YAML/TOML scalars,
/// sequences, and mappings while preserving order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<MetaValue>),
    Mapping(IndexMap<String, MetaValue>),
}

/// A placeholder replacement: either a literal, or a set of literals keyed
/// by a runtime discriminator such as the selected shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replacement {
    Literal(String),
    Discriminated {
        discriminator: String,
        options: IndexMap<String, String>,
    },
}

/// A reusable agent command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDef {
    /// Command name, unique within the namespace
    pub name: String,

    /// One-line description, surfaced in frontmatter
    pub description: String,

    /// Prompt template; placeholders are resolved per agent
    pub prompt: String,

    /// Per-command placeholder replacements
    #[serde(default)]
    pub replacements: IndexMap<String, Replacement>,

    /// Every field not named above passes through to the generated
    /// frontmatter verbatim, in insertion order
    #[serde(flatten)]
    pub metadata: IndexMap<String, MetaValue>,
}

/// A rule (instruction) definition; same shape as a command but the name is
/// optional and derived from the description when absent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleDef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(alias = "title")]
    pub description: String,

    #[serde(alias = "content")]
    pub prompt: String,

    #[serde(default)]
    pub replacements: IndexMap<String, Replacement>,

    #[serde(flatten)]
    pub metadata: IndexMap<String, MetaValue>,
}

impl RuleDef {
    /// Declared name, or a slug of the description
    pub fn effective_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => slug(&self.description),
        }
    }
}

/// Normalize free text into a filename-safe slug
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// MCP server connection, discriminated by transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McpServerDef {
    pub name: String,
    pub transport: McpTransport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    Stdio {
        command: String,
        args: Vec<String>,
        env: IndexMap<String, String>,
    },
    Http {
        url: String,
        headers: IndexMap<String, String>,
    },
}

/// Raw shape accepted in source files. The `transport` discriminant is
/// mandatory only when both variants could match structurally; with exactly
/// one of `command`/`url` present it is inferred.
#[derive(Debug, Deserialize)]
struct RawMcpServer {
    name: String,
    #[serde(default)]
    transport: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: IndexMap<String, String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    headers: IndexMap<String, String>,
}

impl<'de> Deserialize<'de> for McpServerDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawMcpServer::deserialize(deserializer)?;

        let transport = match raw.transport.as_deref() {
            Some("stdio") => {
                let command = raw
                    .command
                    .ok_or_else(|| D::Error::custom(format!("mcp server {}: stdio transport requires `command`", raw.name)))?;
                McpTransport::Stdio {
                    command,
                    args: raw.args,
                    env: raw.env,
                }
            }
            Some("http") => {
                let url = raw
                    .url
                    .ok_or_else(|| D::Error::custom(format!("mcp server {}: http transport requires `url`", raw.name)))?;
                McpTransport::Http {
                    url,
                    headers: raw.headers,
                }
            }
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "mcp server {}: unknown transport `{}` (expected stdio or http)",
                    raw.name, other
                )));
            }
            None => match (raw.command, raw.url) {
                (Some(command), None) => McpTransport::Stdio {
                    command,
                    args: raw.args,
                    env: raw.env,
                },
                (None, Some(url)) => McpTransport::Http {
                    url,
                    headers: raw.headers,
                },
                (Some(_), Some(_)) => {
                    return Err(D::Error::custom(format!(
                        "mcp server {}: both `command` and `url` present, `transport` is required",
                        raw.name
                    )));
                }
                (None, None) => {
                    return Err(D::Error::custom(format!(
                        "mcp server {}: neither `command` nor `url` present",
                        raw.name
                    )));
                }
            },
        };

        Ok(McpServerDef {
            name: raw.name,
            transport,
        })
    }
}

/// Fully merged definition model for one invocation
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: Option<ProjectConfig>,
    pub variables: IndexMap<String, VariableDef>,
    pub commands: Vec<CommandDef>,
    pub rules: Vec<RuleDef>,
    pub mcp_servers: Vec<McpServerDef>,
}

impl Config {
    /// Namespace prefix for generated filenames, when the project declares one
    pub fn namespace(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.namespace.as_deref())
    }
}
