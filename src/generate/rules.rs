//! Rule artifact generation
//!
//! Two modes. `merged` concatenates every rule under a heading derived from
//! its description into the agent's single rules file. `separate` writes one
//! file per rule, named from a slug of its title, each with its own
//! frontmatter. An agent that does not support the requested mode fails for
//! that agent only.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::registry::{AgentSpec, Dialect, RuleMode};
use crate::resolver::ResolveContext;
use crate::schema::{MetaValue, RuleDef};

use super::frontmatter;

/// Guard a requested mode against the agent's capabilities
pub fn check_mode(spec: &AgentSpec, mode: RuleMode) -> Result<()> {
    if spec.supports_rule_mode(mode) {
        Ok(())
    } else {
        Err(Error::UnsupportedRuleMode {
            agent: spec.id.to_string(),
            mode: mode.to_string(),
        })
    }
}

/// Render every rule into the single merged document
pub fn render_merged<'a>(rules: &'a [RuleDef], project_name: &str, ctx: &ResolveContext<'a>) -> Result<String> {
    let mut body = format!("# {project_name}\n");

    for rule in rules {
        let ctx = ctx.with_replacements(&rule.replacements);
        let description = ctx.resolve(&rule.description)?;
        let prompt = ctx.resolve(&rule.prompt)?;
        body.push_str(&format!("\n## {description}\n\n{}\n", prompt.trim_end()));
    }

    Ok(body)
}

/// Output path for one rule in separate mode, relative to the output root
pub fn rule_path(rule: &RuleDef, namespace: Option<&str>, spec: &AgentSpec) -> String {
    let name = rule.effective_name();
    let filename = match namespace {
        Some(ns) => format!("{ns}-{name}.{}", spec.rules_extension),
        None => format!("{name}.{}", spec.rules_extension),
    };
    format!("{}/{}", spec.rules_dir, filename)
}

/// Render one rule as its own document, frontmatter included
pub fn render_separate<'a>(rule: &'a RuleDef, spec: &AgentSpec, ctx: &ResolveContext<'a>) -> Result<String> {
    let ctx = ctx.with_replacements(&rule.replacements);
    let description = ctx.resolve(&rule.description)?;
    let prompt = ctx.resolve(&rule.prompt)?;

    let mut fields: IndexMap<String, MetaValue> = IndexMap::new();
    fields.insert("description".to_string(), MetaValue::String(description));
    for (name, value) in &rule.metadata {
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
