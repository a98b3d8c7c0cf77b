//! Config loading and merging
//!
//! Turns on-disk sources into a `Config`. Two layouts are supported: a
//! monolithic `charlie.yaml`, and a `.charlie/` directory with one definition
//! per file (Markdown with frontmatter, or plain YAML). When both are present
//! their collections are unioned; a name collision within one kind is a
//! load-time error, reported before anything is generated.

use indexmap::IndexMap;
use lazy_regex::regex_is_match;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{DefinitionKind, Error, Result};
use crate::schema::{CommandDef, Config, McpServerDef, ProjectConfig, RuleDef, VariableDef};

const MONOLITHIC_CANDIDATES: &[&str] = &["charlie.yaml", "charlie.yml"];
const DIST_FILE: &str = "charlie.dist.yaml";
const CHARLIE_DIR: &str = ".charlie";

/// On-disk shape of the monolithic file
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    project: Option<ProjectConfig>,
    #[serde(default)]
    variables: IndexMap<String, VariableDef>,
    #[serde(default)]
    commands: Vec<CommandDef>,
    #[serde(default)]
    rules: Vec<RuleDef>,
    #[serde(default, alias = "mcp-servers")]
    mcp_servers: Vec<McpServerDef>,
}

/// Load and merge every source under `root`
///
/// Source priority: `explicit` file if given, else `charlie.yaml` /
/// `charlie.yml`, else `charlie.dist.yaml`. A `.charlie/` directory is loaded
/// whenever present and unioned with the monolithic collections.
pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let monolithic = find_monolithic(root, explicit)?;
    let charlie_dir = root.join(CHARLIE_DIR);

    if monolithic.is_none() && !charlie_dir.is_dir() {
        return Err(Error::ConfigNotFound(root.to_path_buf()));
    }

    let manifest = match &monolithic {
        Some(path) => {
            log::info!("loading {}", path.display());
            parse_manifest(path)?
        }
        None => Manifest::default(),
    };

    if let Some(version) = &manifest.version {
        if !version.starts_with("1.") {
            return Err(Error::ConfigParse(format!(
                "unsupported schema version {version} (only 1.x is supported)"
            )));
        }
    }
    if let Some(project) = &manifest.project {
        validate_namespace(project)?;
    }

    let mut config = Config {
        project: manifest.project,
        variables: manifest.variables,
        commands: manifest.commands,
        rules: manifest.rules,
        mcp_servers: manifest.mcp_servers,
    };

    if charlie_dir.is_dir() {
        log::info!("loading definitions from {}", charlie_dir.display());
        load_directory(&charlie_dir, &mut config)?;
    }

    check_duplicates(config.commands.iter().map(|c| c.name.clone()), DefinitionKind::Command)?;
    check_duplicates(config.rules.iter().map(|r| r.effective_name()), DefinitionKind::Rule)?;
    check_duplicates(config.mcp_servers.iter().map(|s| s.name.clone()), DefinitionKind::McpServer)?;

    Ok(config)
}

fn find_monolithic(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    for candidate in MONOLITHIC_CANDIDATES {
        let path = root.join(candidate);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    // the dist file is a committed template, honored only when the real
    // config is absent
    let dist = root.join(DIST_FILE);
    if dist.is_file() {
        return Ok(Some(dist));
    }

    Ok(None)
}

fn validate_namespace(project: &ProjectConfig) -> Result<()> {
    if let Some(namespace) = &project.namespace {
        if !regex_is_match!(r"^[A-Za-z0-9_-]+$", namespace) {
            return Err(Error::ConfigParse(format!(
                "invalid namespace `{namespace}`: expected letters, digits, `-` or `_`"
            )));
        }
    }
    Ok(())
}

fn parse_manifest(path: &Path) -> Result<Manifest> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))?;
    if content.trim().is_empty() {
        return Err(Error::ConfigParse(format!("configuration file is empty: {}", path.display())));
    }
    serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))
}

fn load_directory(charlie_dir: &Path, config: &mut Config) -> Result<()> {
    for path in sorted_files(&charlie_dir.join("commands"), &["md", "yaml", "yml"]) {
        let command: CommandDef = parse_definition_file(&path, "prompt")?;
        config.commands.push(command);
    }

    for path in sorted_files(&charlie_dir.join("rules"), &["md", "yaml", "yml"]) {
        let rule: RuleDef = parse_definition_file(&path, "prompt")?;
        config.rules.push(rule);
    }

    for path in sorted_files(&charlie_dir.join("mcp-servers"), &["yaml", "yml"]) {
        let server: McpServerDef = parse_definition_file(&path, "prompt")?;
        config.mcp_servers.push(server);
    }

    Ok(())
}

/// Immediate children of `dir` with one of `extensions`, in sorted path
/// order so merge behavior and error reporting stay deterministic
fn sorted_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .collect()
}

/// Parse one definition file: Markdown puts its frontmatter fields alongside
/// the body under `body_key`; YAML files carry every field directly
fn parse_definition_file<T: DeserializeOwned>(path: &Path, body_key: &str) -> Result<T> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))?;
    if content.trim().is_empty() {
        return Err(Error::ConfigParse(format!("file is empty: {}", path.display())));
    }

    let value = if path.extension().and_then(|e| e.to_str()) == Some("md") {
        let (frontmatter, body) = split_frontmatter(&content)
            .map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))?;

        let mut mapping = match frontmatter {
            Some(yaml) => match serde_yaml::from_str(yaml)
                .map_err(|e| Error::ConfigParse(format!("{}: invalid frontmatter: {e}", path.display())))?
            {
                serde_yaml::Value::Mapping(mapping) => mapping,
                serde_yaml::Value::Null => serde_yaml::Mapping::new(),
                _ => {
                    return Err(Error::ConfigParse(format!(
                        "{}: frontmatter must be a mapping",
                        path.display()
                    )));
                }
            },
            None => serde_yaml::Mapping::new(),
        };

        let name_key = serde_yaml::Value::from("name");
        if !mapping.contains_key(&name_key) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                mapping.insert(name_key, serde_yaml::Value::from(stem));
            }
        }
        mapping.insert(serde_yaml::Value::from(body_key), serde_yaml::Value::from(body.trim()));

        serde_yaml::Value::Mapping(mapping)
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))?
    };

    serde_yaml::from_value(value).map_err(|e| Error::ConfigParse(format!("{}: {e}", path.display())))
}

/// Split a `---`-delimited YAML frontmatter block off a Markdown document
fn split_frontmatter(content: &str) -> std::result::Result<(Option<&str>, &str), String> {
    let content = content.trim_start();
    if !content.starts_with("---") {
        return Ok((None, content));
    }

    let rest = &content[3..];
    let end = rest
        .find("\n---")
        .ok_or_else(|| "closing frontmatter delimiter `---` not found".to_string())?;

    let frontmatter = rest[..end].trim();
    let after = &rest[end + 4..];
    let body = after.split_once('\n').map(|(_, b)| b).unwrap_or("").trim_start();

    let frontmatter = (!frontmatter.is_empty()).then_some(frontmatter);
    Ok((frontmatter, body))
}

fn check_duplicates(names: impl Iterator<Item = String>, kind: DefinitionKind) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateDefinition { name, kind });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const MONOLITHIC: &str = r#"
version: "1.0"
project:
  name: myapp
  namespace: myapp
commands:
  - name: deploy
    description: Deploy the app
    prompt: "Deploy: {{user_input}}"
mcp_servers:
  - name: files
    transport: stdio
    command: npx
"#;

    #[test]
    fn test_load_monolithic() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "charlie.yaml", MONOLITHIC);

        let config = load(dir.path(), None).unwrap();
        assert_eq!(config.project.as_ref().unwrap().name, "myapp");
        assert_eq!(config.commands.len(), 1);
        assert_eq!(config.mcp_servers.len(), 1);
    }

    #[test]
    fn test_no_source_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("elsewhere.yaml");
        let err = load(dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_dist_file_used_only_without_real_config() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "charlie.dist.yaml",
            "project:\n  name: from-dist\ncommands: []\n",
        );
        let config = load(dir.path(), None).unwrap();
        assert_eq!(config.project.as_ref().unwrap().name, "from-dist");

        write(dir.path(), "charlie.yaml", "project:\n  name: real\ncommands: []\n");
        let config = load(dir.path(), None).unwrap();
        assert_eq!(config.project.as_ref().unwrap().name, "real");
    }

    #[test]
    fn test_load_directory_layout() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".charlie/commands/build.md",
            "---\ndescription: Build it\n---\n\nBuild {{user_input}}\n",
        );
        write(
            dir.path(),
            ".charlie/commands/test.yaml",
            "name: test\ndescription: Test it\nprompt: Run the tests\n",
        );
        write(
            dir.path(),
            ".charlie/rules/style.md",
            "---\ndescription: Code style\n---\n\nFollow the style guide\n",
        );
        write(
            dir.path(),
            ".charlie/mcp-servers/files.yaml",
            "name: files\ntransport: stdio\ncommand: npx\n",
        );

        let config = load(dir.path(), None).unwrap();
        // sorted by path: build before test
        assert_eq!(config.commands[0].name, "build");
        assert_eq!(config.commands[0].prompt, "Build {{user_input}}");
        assert_eq!(config.commands[1].name, "test");
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].prompt, "Follow the style guide");
        assert_eq!(config.mcp_servers.len(), 1);
    }

    #[test]
    fn test_union_of_monolithic_and_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "charlie.yaml", MONOLITHIC);
        write(
            dir.path(),
            ".charlie/commands/review.md",
            "---\ndescription: Review\n---\n\nReview the diff\n",
        );

        let config = load(dir.path(), None).unwrap();
        let names: Vec<&str> = config.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["deploy", "review"]);
    }

    #[test]
    fn test_duplicate_across_sources_fails_at_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "charlie.yaml", MONOLITHIC);
        write(
            dir.path(),
            ".charlie/commands/deploy.md",
            "---\ndescription: Another deploy\n---\n\nbody\n",
        );

        let err = load(dir.path(), None).unwrap_err();
        match err {
            Error::DuplicateDefinition { name, kind } => {
                assert_eq!(name, "deploy");
                assert_eq!(kind, DefinitionKind::Command);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_within_monolithic_fails() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "charlie.yaml",
            r#"
commands:
  - name: deploy
    description: a
    prompt: a
  - name: deploy
    description: b
    prompt: b
"#,
        );
        let err = load(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_empty_monolithic_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "charlie.yaml", "\n\n");
        let err = load(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "charlie.yaml",
            "project:\n  name: x\n  namespace: \"no spaces!\"\n",
        );
        let err = load(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "charlie.yaml", "version: \"2.0\"\ncommands: []\n");
        let err = load(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_md_without_closing_delimiter_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".charlie/commands/bad.md", "---\ndescription: x\n\nno close\n");
        let err = load(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_split_frontmatter_variants() {
        let (fm, body) = split_frontmatter("---\na: 1\n---\n\nbody\n").unwrap();
        assert_eq!(fm.unwrap(), "a: 1");
        assert_eq!(body, "body\n");

        let (fm, body) = split_frontmatter("no frontmatter here").unwrap();
        assert!(fm.is_none());
        assert_eq!(body, "no frontmatter here");
    }
}
