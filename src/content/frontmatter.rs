//! Front-matter splitting and decoding

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::PostError;

const YAML_DELIMITER: &str = "---";
const JSON_DELIMITER: &str = ";;;";

/// Syntax the front-matter block was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

/// The raw key/value block that precedes a post body, in authored order
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub format: Format,
    pub fields: IndexMap<String, Value>,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            format: Format::Yaml,
            fields: IndexMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), PostError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let content = content.trim_start_matches(['\n', '\r']);

        if content.starts_with(YAML_DELIMITER) {
            let (block, body) = split_block(content, YAML_DELIMITER)?;
            return Ok((Self::parse_yaml(block)?, body));
        }

        if content.starts_with(JSON_DELIMITER) {
            let (block, body) = split_block(content, JSON_DELIMITER)?;
            return Ok((Self::parse_json(block)?, body));
        }

        Err(PostError::MissingFrontMatter)
    }

    fn parse_yaml(block: &str) -> Result<Self, PostError> {
        if block.trim().is_empty() {
            return Ok(Self::default());
        }

        let fields = match serde_yaml::from_str::<Value>(block)? {
            Value::Null => IndexMap::new(),
            Value::Mapping(mapping) => {
                let mut fields = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    match key {
                        Value::String(key) => {
                            fields.insert(key, value);
                        }
                        _ => return Err(PostError::NotAMapping),
                    }
                }
                fields
            }
            _ => return Err(PostError::NotAMapping),
        };

        Ok(Self {
            format: Format::Yaml,
            fields,
        })
    }

    fn parse_json(block: &str) -> Result<Self, PostError> {
        let trimmed = block.trim();
        if trimmed.is_empty() {
            return Ok(Self {
                format: Format::Json,
                fields: IndexMap::new(),
            });
        }

        // Hexo allows the outer braces to be omitted
        let fields: IndexMap<String, Value> = if trimmed.starts_with('{') {
            serde_json::from_str(trimmed)?
        } else {
            serde_json::from_str(&format!("{{{}}}", trimmed))?
        };

        Ok(Self {
            format: Format::Json,
            fields,
        })
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Render as a YAML block including both delimiter lines
    pub fn to_yaml_block(&self) -> Result<String, PostError> {
        let mut out = String::from(YAML_DELIMITER);
        out.push('\n');
        if !self.fields.is_empty() {
            out.push_str(&serde_yaml::to_string(&self.fields)?);
        }
        out.push_str(YAML_DELIMITER);
        out.push('\n');
        Ok(out)
    }
}

/// Split `content` into the text between the first two `delimiter` lines and
/// whatever follows the closing line.
fn split_block<'a>(
    content: &'a str,
    delimiter: &'static str,
) -> Result<(&'a str, &'a str), PostError> {
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().unwrap_or_default();
    if first.trim_end() != delimiter {
        return Err(PostError::MissingFrontMatter);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == delimiter {
            return Ok((&content[start..offset], &content[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(PostError::UnterminatedFrontMatter { delimiter })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00 +08:00
tags:
  - c
  - casting
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.format, Format::Yaml);
        assert_eq!(fm.get("title").and_then(Value::as_str), Some("Hello World"));
        assert_eq!(
            fm.get("date").and_then(Value::as_str),
            Some("2024-01-15 10:30:00 +08:00")
        );
        assert_eq!(remaining, "\nThis is the content.\n");
    }

    #[test]
    fn test_keys_keep_authored_order() {
        let content = "---\nzeta: 1\ntitle: t\nalpha: 2\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<_> = fm.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "title", "alpha"]);
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = ";;;\n\"title\": \"Test Post\",\n\"tags\": [\"a\", \"b\"]\n;;;\nThis is content.\n";

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.format, Format::Json);
        assert_eq!(fm.get("title").and_then(Value::as_str), Some("Test Post"));
        assert_eq!(remaining, "This is content.\n");
    }

    #[test]
    fn test_parse_json_with_braces() {
        let content = ";;;\n{\"title\": \"Braced\"}\n;;;\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.get("title").and_then(Value::as_str), Some("Braced"));
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_missing_opening_delimiter() {
        let err = FrontMatter::parse("# Just markdown\n").unwrap_err();
        assert!(matches!(err, PostError::MissingFrontMatter));

        // `----` is a thematic break, not a delimiter
        let err = FrontMatter::parse("----\ntitle: x\n---\n").unwrap_err();
        assert!(matches!(err, PostError::MissingFrontMatter));
    }

    #[test]
    fn test_unterminated_block() {
        let err = FrontMatter::parse("---\ntitle: x\n\nbody text\n").unwrap_err();
        assert!(matches!(
            err,
            PostError::UnterminatedFrontMatter { delimiter: "---" }
        ));
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.get("title").and_then(Value::as_str), Some("Windows"));
        assert_eq!(remaining, "Body\r\n");
    }

    #[test]
    fn test_closing_delimiter_at_eof() {
        let (fm, remaining) = FrontMatter::parse("---\ntitle: x\n---").unwrap();
        assert_eq!(fm.fields.len(), 1);
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_body_separators_are_left_alone() {
        let content = "---\ntitle: x\n---\nintro\n\n---\n\nafter the rule\n";
        let (_, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(remaining, "intro\n\n---\n\nafter the rule\n");
    }

    #[test]
    fn test_empty_block_is_empty_mapping() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nbody").unwrap();
        assert!(fm.fields.is_empty());
        assert_eq!(remaining, "body");
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = FrontMatter::parse("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, PostError::NotAMapping));

        let err = FrontMatter::parse("---\njust prose here\n---\n").unwrap_err();
        assert!(matches!(err, PostError::NotAMapping));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, PostError::Yaml(_)));
    }

    #[test]
    fn test_yaml_block_rendering() {
        let mut fm = FrontMatter::default();
        fm.fields
            .insert("title".to_string(), Value::String("Casts".to_string()));
        fm.fields.insert("draft".to_string(), Value::Bool(true));
        assert_eq!(
            fm.to_yaml_block().unwrap(),
            "---\ntitle: Casts\ndraft: true\n---\n"
        );
    }
}
