//! Placeholder resolution
//!
//! Expands the fixed `{{token}}` / `{{env:NAME}}` / `{{var:NAME}}` grammar
//! against a per-agent generation context. Resolution is single-pass and
//! total: every token in a string must be recognized, otherwise the whole
//! resolution fails naming the offending token. Replacement output is never
//! rescanned, so a string without placeholder syntax resolves to itself.

use indexmap::IndexMap;
use lazy_regex::regex;

use crate::error::{Error, Result};
use crate::schema::{Replacement, VariableDef};

/// Name→value environment for `env:`/`var:` lookups
///
/// Two layers: the operating-system environment and a parsed dotenv file.
/// The system environment always wins on conflict.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    system: IndexMap<String, String>,
    dotenv: IndexMap<String, String>,
}

impl Environment {
    pub fn new(system: IndexMap<String, String>, dotenv: IndexMap<String, String>) -> Self {
        Self { system, dotenv }
    }

    /// Snapshot the process environment over a dotenv map
    pub fn capture(dotenv: IndexMap<String, String>) -> Self {
        Self::new(std::env::vars().collect(), dotenv)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.system
            .get(name)
            .or_else(|| self.dotenv.get(name))
            .map(String::as_str)
    }
}

/// Everything a single resolution pass can draw from
pub struct ResolveContext<'a> {
    /// Built-in content and path tokens for the current agent
    tokens: IndexMap<String, String>,
    /// Per-definition replacements, when resolving a command or rule
    replacements: Option<&'a IndexMap<String, Replacement>>,
    variables: &'a IndexMap<String, VariableDef>,
    env: &'a Environment,
    /// Runtime discriminator values, e.g. shell=bash, os=linux
    discriminators: IndexMap<String, String>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        tokens: IndexMap<String, String>,
        variables: &'a IndexMap<String, VariableDef>,
        env: &'a Environment,
        discriminators: IndexMap<String, String>,
    ) -> Self {
        Self {
            tokens,
            replacements: None,
            variables,
            env,
            discriminators,
        }
    }

    /// The same context, scoped to one definition's replacements
    pub fn with_replacements(&self, replacements: &'a IndexMap<String, Replacement>) -> ResolveContext<'a> {
        ResolveContext {
            tokens: self.tokens.clone(),
            replacements: Some(replacements),
            variables: self.variables,
            env: self.env,
            discriminators: self.discriminators.clone(),
        }
    }

    /// Expand every placeholder in `text`
    pub fn resolve(&self, text: &str) -> Result<String> {
        let pattern = regex!(r"\{\{([^{}]*)\}\}");

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in pattern.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            out.push_str(&text[last..whole.start()]);
            out.push_str(&self.lookup(caps[1].trim())?);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn lookup(&self, token: &str) -> Result<String> {
        if let Some((prefix, name)) = token.split_once(':') {
            return match prefix {
                "env" => self.lookup_env(name),
                "var" => self.lookup_var(name),
                _ => Err(Error::UnknownPlaceholder(token.to_string())),
            };
        }

        if let Some(value) = self.tokens.get(token) {
            return Ok(value.clone());
        }

        if let Some(replacement) = self.replacements.and_then(|r| r.get(token)) {
            return self.apply_replacement(replacement);
        }

        Err(Error::UnknownPlaceholder(token.to_string()))
    }

    fn lookup_env(&self, name: &str) -> Result<String> {
        self.env
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| Error::EnvironmentVariableNotFound(name.to_string()))
    }

    fn lookup_var(&self, name: &str) -> Result<String> {
        // An undeclared variable reads the environment under its own name
        let Some(def) = self.variables.get(name) else {
            return self.lookup_env(name);
        };

        let env_name = def.env.as_deref().unwrap_or(name);
        if let Some(value) = self.env.get(env_name) {
            return Ok(value.to_string());
        }
        if let Some(default) = &def.default {
            return Ok(default.clone());
        }
        Err(Error::EnvironmentVariableNotFound(name.to_string()))
    }

    fn apply_replacement(&self, replacement: &Replacement) -> Result<String> {
        match replacement {
            Replacement::Literal(value) => Ok(value.clone()),
            Replacement::Discriminated { discriminator, options } => {
                let current = self
                    .discriminators
                    .get(discriminator)
                    .map(String::as_str)
                    .unwrap_or("unset");
                options
                    .get(current)
                    .cloned()
                    .ok_or_else(|| Error::MissingDiscriminatorOption {
                        key: discriminator.clone(),
                        value: current.to_string(),
                    })
            }
        }
    }
}
