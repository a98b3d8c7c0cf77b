//! Dotenv file loading
//!
//! Supplies a raw name→value map to the resolver. The system environment
//! always wins on conflict; that precedence lives in `resolver::Environment`,
//! not here.

use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Load `.env`-style `KEY=VALUE` lines from a file, if it exists
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// accepted, and matching single or double quotes around the value are
/// stripped. Malformed lines are ignored with a warning rather than failing
/// the run.
pub fn load(path: &Path) -> IndexMap<String, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return IndexMap::new();
    };
    log::debug!("loaded dotenv file: {}", path.display());
    parse(&content)
}

fn parse(content: &str) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            log::warn!("ignoring malformed dotenv line {}: {}", lineno + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            log::warn!("ignoring dotenv line {} with empty key", lineno + 1);
            continue;
        }

        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    vars
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let vars = parse("API_KEY=abc123\nREGION=us-east-1\n");
        assert_eq!(vars["API_KEY"], "abc123");
        assert_eq!(vars["REGION"], "us-east-1");
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let vars = parse("# comment\n\nKEY=value\n");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["KEY"], "value");
    }

    #[test]
    fn test_parse_export_prefix_and_quotes() {
        let vars = parse("export TOKEN=\"se cret\"\nNAME='single'\n");
        assert_eq!(vars["TOKEN"], "se cret");
        assert_eq!(vars["NAME"], "single");
    }

    #[test]
    fn test_parse_ignores_malformed() {
        let vars = parse("no equals sign here\nOK=1\n");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["OK"], "1");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let vars = load(Path::new("/definitely/not/here/.env"));
        assert!(vars.is_empty());
    }

    #[test]
    fn test_value_with_equals_kept_whole() {
        let vars = parse("URL=https://x?a=1&b=2\n");
        assert_eq!(vars["URL"], "https://x?a=1&b=2");
    }
}
