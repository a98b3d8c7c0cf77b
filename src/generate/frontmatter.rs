//! Frontmatter serialization
//!
//! Renders resolved core fields plus pass-through metadata into the target
//! agent's dialect. Sequences and mappings always come out in block form so
//! regeneration diffs stay line-oriented.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::schema::MetaValue;

/// A `---`-delimited YAML frontmatter block
pub fn yaml_block(fields: &IndexMap<String, MetaValue>) -> Result<String> {
    let yaml = serde_yaml::to_string(fields).map_err(|e| Error::Serialize(e.to_string()))?;
    Ok(format!("---\n{yaml}---\n"))
}

/// A standalone TOML document carrying the same fields
pub fn toml_document(fields: &IndexMap<String, MetaValue>) -> Result<String> {
    toml::to_string_pretty(fields).map_err(|e| Error::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: Vec<(&str, MetaValue)>) -> IndexMap<String, MetaValue> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_yaml_block_basic() {
        let out = yaml_block(&fields(vec![
            ("description", MetaValue::String("Deploy the app".to_string())),
            ("model", MetaValue::String("fast".to_string())),
        ]))
        .unwrap();
        assert_eq!(out, "---\ndescription: Deploy the app\nmodel: fast\n---\n");
    }

    #[test]
    fn test_yaml_sequences_are_block_lists() {
        let out = yaml_block(&fields(vec![(
            "tags",
            MetaValue::Sequence(vec![
                MetaValue::String("a".to_string()),
                MetaValue::String("b".to_string()),
            ]),
        )]))
        .unwrap();
        assert!(out.contains("tags:\n- a\n- b\n"), "unexpected output: {out}");
    }

    #[test]
    fn test_yaml_preserves_field_name_case_and_order() {
        let out = yaml_block(&fields(vec![
            ("allowed-tools", MetaValue::String("Bash".to_string())),
            ("applyTo", MetaValue::String("**/*.rs".to_string())),
            ("aaa", MetaValue::Bool(true)),
        ]))
        .unwrap();
        let allowed = out.find("allowed-tools").unwrap();
        let apply = out.find("applyTo").unwrap();
        let aaa = out.find("aaa:").unwrap();
        assert!(allowed < apply && apply < aaa, "order lost: {out}");
    }

    #[test]
    fn test_toml_document_basic() {
        let out = toml_document(&fields(vec![
            ("description", MetaValue::String("Deploy".to_string())),
            ("prompt", MetaValue::String("line one\nline two\n".to_string())),
        ]))
        .unwrap();
        assert!(out.contains("description = \"Deploy\""), "unexpected output: {out}");
        // multiline strings come out triple-quoted
        assert!(out.contains("'''") || out.contains("\"\"\""), "unexpected output: {out}");
    }

    #[test]
    fn test_toml_numbers_and_bools() {
        let out = toml_document(&fields(vec![
            ("count", MetaValue::Int(3)),
            ("enabled", MetaValue::Bool(true)),
        ]))
        .unwrap();
        assert!(out.contains("count = 3"));
        assert!(out.contains("enabled = true"));
    }
}
