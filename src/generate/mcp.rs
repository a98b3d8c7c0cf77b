//! MCP server config generation
//!
//! One JSON document per agent aggregating every server definition into a
//! `{serverName: serverConfig}` mapping. The transport discriminant selects
//! which shape is emitted; it is not itself part of the output. `env` is
//! always present on stdio servers, empty or not, to keep the schema stable.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::schema::{McpServerDef, McpTransport};

#[derive(Serialize)]
#[serde(untagged)]
enum ServerConfig<'a> {
    Stdio {
        command: &'a str,
        args: &'a [String],
        env: &'a IndexMap<String, String>,
    },
    Http {
        url: &'a str,
        headers: &'a IndexMap<String, String>,
    },
}

/// Render every server into one JSON document
pub fn render_mcp(servers: &[McpServerDef]) -> Result<String> {
    let mut document: IndexMap<&str, ServerConfig> = IndexMap::new();

    for server in servers {
        let config = match &server.transport {
            McpTransport::Stdio { command, args, env } => ServerConfig::Stdio { command, args, env },
            McpTransport::Http { url, headers } => ServerConfig::Http { url, headers },
        };
        document.insert(server.name.as_str(), config);
    }

    let json = serde_json::to_string_pretty(&document).map_err(|e| Error::Serialize(e.to_string()))?;
    Ok(json + "\n")
}
