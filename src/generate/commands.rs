//! Command document generation
//!
//! One document per command per agent: resolved description plus pass-through
//! metadata in a frontmatter block, then the resolved prompt body, in the
//! agent's dialect.

use indexmap::IndexMap;

use crate::error::Result;
use crate::registry::{AgentSpec, Dialect};
use crate::resolver::ResolveContext;
use crate::schema::{CommandDef, MetaValue};

use super::frontmatter;

/// Output path for one command, relative to the output root
pub fn command_path(command: &CommandDef, namespace: Option<&str>, spec: &AgentSpec) -> String {
    let filename = match namespace {
        Some(ns) => format!("{ns}-{}.{}", command.name, spec.commands_extension),
        None => format!("{}.{}", command.name, spec.commands_extension),
    };
    format!("{}/{}", spec.commands_dir, filename)
}

/// Render one command into the agent's dialect
pub fn render_command<'a>(command: &'a CommandDef, spec: &AgentSpec, ctx: &ResolveContext<'a>) -> Result<String> {
    let ctx = ctx.with_replacements(&command.replacements);
    let description = ctx.resolve(&command.description)?;
    let prompt = ctx.resolve(&command.prompt)?;

    let mut fields: IndexMap<String, MetaValue> = IndexMap::new();
    fields.insert("description".to_string(), MetaValue::String(description));
    for (name, value) in &command.metadata {
        fields.insert(name.clone(), value.clone());
    }

    match spec.dialect {
        Dialect::YamlMarkdown => {
            let block = frontmatter::yaml_block(&fields)?;
            Ok(format!("{block}\n{}\n", prompt.trim_end()))
        }
        Dialect::Toml => {
            fields.insert("prompt".to_string(), MetaValue::String(prompt));
            frontmatter::toml_document(&fields)
        }
    }
}
