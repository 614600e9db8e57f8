//! Post model: a validated front-matter record plus its Markdown body

use chrono::{DateTime, FixedOffset};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_yaml::Value;

use super::frontmatter::FrontMatter;
use super::markdown::{self, MarkdownOutline};
use crate::error::{FieldError, PostError, Warning};
use crate::helpers::{self, TimestampError};

/// Keys with a meaning of their own; everything else lands in `extra`
pub const RECOGNISED_KEYS: &[&str] = &[
    "title",
    "date",
    "updated",
    "tags",
    "draft",
    "published",
    "summary",
];

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Post title, never blank
    pub title: String,

    /// Publication date with the offset it was written in
    pub date: DateTime<FixedOffset>,

    /// Last updated date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<FixedOffset>>,

    /// Post tags; authored order is kept but ignored for equality
    pub tags: IndexSet<String>,

    /// Unpublished or incomplete
    pub draft: bool,

    /// Optional hand-written summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Unrecognised front-matter fields, in authored order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Value>,

    /// Raw markdown body
    pub body: String,
}

/// A post together with the non-fatal issues found while validating it
#[derive(Debug, Clone)]
pub struct Parsed {
    pub post: Post,
    pub warnings: Vec<Warning>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: impl Into<String>, date: DateTime<FixedOffset>) -> Self {
        Self {
            title: title.into(),
            date,
            updated: None,
            tags: IndexSet::new(),
            draft: false,
            summary: None,
            extra: IndexMap::new(),
            body: String::new(),
        }
    }

    /// Parse and validate a complete post file
    pub fn parse(content: &str) -> Result<Post, PostError> {
        Self::parse_with_warnings(content).map(|parsed| parsed.post)
    }

    /// Parse and validate, keeping warnings
    pub fn parse_with_warnings(content: &str) -> Result<Parsed, PostError> {
        let (fm, body) = FrontMatter::parse(content)?;
        Self::from_front_matter(&fm, body)
    }

    /// Validate an already split front-matter block.
    ///
    /// All field errors are collected, so one pass reports every problem.
    pub fn from_front_matter(fm: &FrontMatter, body: &str) -> Result<Parsed, PostError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let title = validate_title(fm.get("title"), &mut errors);
        let date = validate_date(fm.get("date"), &mut errors);
        let updated = validate_updated(fm.get("updated"), &mut errors);
        let tags = validate_tags(fm.get("tags"), &mut errors, &mut warnings);
        let draft = validate_draft(fm.get("draft"), fm.get("published"), &mut errors);
        let summary = validate_summary(fm.get("summary"), &mut errors);

        let extra: IndexMap<String, Value> = fm
            .fields
            .iter()
            .filter(|(key, _)| !RECOGNISED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        warnings.extend(extra.keys().cloned().map(Warning::UnknownKey));

        match (title, date) {
            (Some(title), Some(date)) if errors.is_empty() => {
                if matches!(updated, Some(u) if u < date) {
                    warnings.push(Warning::UpdatedBeforeDate);
                }
                Ok(Parsed {
                    post: Post {
                        title,
                        date,
                        updated,
                        tags,
                        draft,
                        summary,
                        extra,
                        body: body.to_string(),
                    },
                    warnings,
                })
            }
            _ => Err(PostError::Invalid { errors }),
        }
    }

    /// Serialize back into front-matter plus body.
    ///
    /// Keys come out as title, date, updated, tags, draft, summary, then any
    /// extra keys in their original order. The body is written verbatim.
    pub fn to_markdown(&self) -> Result<String, PostError> {
        let mut fm = FrontMatter::default();
        let fields = &mut fm.fields;

        fields.insert("title".to_string(), Value::String(self.title.clone()));
        fields.insert(
            "date".to_string(),
            Value::String(helpers::to_front_matter(&self.date)),
        );
        if let Some(updated) = &self.updated {
            fields.insert(
                "updated".to_string(),
                Value::String(helpers::to_front_matter(updated)),
            );
        }
        fields.insert(
            "tags".to_string(),
            Value::Sequence(self.tags.iter().cloned().map(Value::String).collect()),
        );
        fields.insert("draft".to_string(), Value::Bool(self.draft));
        if let Some(summary) = &self.summary {
            fields.insert("summary".to_string(), Value::String(summary.clone()));
        }
        for (key, value) in &self.extra {
            fields.insert(key.clone(), value.clone());
        }

        let mut out = fm.to_yaml_block()?;
        out.push_str(&self.body);
        Ok(out)
    }

    /// Mark as published, optionally restamping the date
    pub fn publish(&mut self, date: Option<DateTime<FixedOffset>>) {
        self.draft = false;
        if let Some(date) = date {
            self.date = date;
        }
    }

    /// URL-friendly name derived from the title
    pub fn slug(&self) -> String {
        slug::slugify(&self.title)
    }

    /// The summary field, else the text before `<!-- more -->`, else the
    /// first paragraph of the body
    pub fn summary_or_excerpt(&self) -> Option<String> {
        self.summary
            .clone()
            .or_else(|| markdown::split_excerpt(&self.body).map(str::to_string))
            .or_else(|| markdown::first_paragraph(&self.body))
    }

    /// Outline of the body
    pub fn outline(&self) -> MarkdownOutline {
        MarkdownOutline::from_body(&self.body)
    }

    /// Whether the post carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

fn validate_title(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let title = match value {
        None => {
            errors.push(FieldError::MissingTitle);
            return None;
        }
        Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        // YAML has already normalised `1.10` to `1.1`, so the authored text is gone
        Some(Value::Number(_)) => {
            errors.push(FieldError::WrongType {
                key: "title".to_string(),
                expected: "text; quote numeric titles",
            });
            return None;
        }
        Some(_) => {
            errors.push(FieldError::WrongType {
                key: "title".to_string(),
                expected: "text",
            });
            return None;
        }
    };

    if title.trim().is_empty() {
        errors.push(FieldError::EmptyTitle);
        return None;
    }
    Some(title)
}

fn validate_date(
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<FixedOffset>> {
    match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::MissingDate);
            None
        }
        Some(Value::String(s)) => match helpers::parse_timestamp(s) {
            Ok(date) => Some(date),
            Err(TimestampError::NoOffset) => {
                errors.push(FieldError::MissingOffset { value: s.clone() });
                None
            }
            Err(TimestampError::Malformed) => {
                errors.push(FieldError::InvalidDate { value: s.clone() });
                None
            }
        },
        Some(other) => {
            errors.push(FieldError::InvalidDate {
                value: describe(other),
            });
            None
        }
    }
}

fn validate_updated(
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<FixedOffset>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match helpers::parse_timestamp(s) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(FieldError::InvalidUpdated { value: s.clone() });
                None
            }
        },
        Some(other) => {
            errors.push(FieldError::InvalidUpdated {
                value: describe(other),
            });
            None
        }
    }
}

fn validate_tags(
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
    warnings: &mut Vec<Warning>,
) -> IndexSet<String> {
    let items: Vec<&Value> = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(seq)) => seq.iter().collect(),
        // A single string is a single tag
        Some(scalar @ (Value::String(_) | Value::Number(_))) => vec![scalar],
        Some(_) => {
            errors.push(FieldError::WrongType {
                key: "tags".to_string(),
                expected: "a list of text values",
            });
            return IndexSet::new();
        }
    };

    let mut tags = IndexSet::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let tag = match item {
            Value::String(s) => s.trim().to_string(),
            Value::Number(_) => {
                errors.push(FieldError::WrongType {
                    key: "tags".to_string(),
                    expected: "a list of text values; quote numeric tags",
                });
                continue;
            }
            Value::Null => String::new(),
            _ => {
                errors.push(FieldError::WrongType {
                    key: "tags".to_string(),
                    expected: "a list of text values",
                });
                continue;
            }
        };
        if tag.is_empty() {
            errors.push(FieldError::EmptyTag { index: i + 1 });
            continue;
        }
        if tags.contains(&tag) {
            warnings.push(Warning::DuplicateTag(tag));
            continue;
        }
        tags.insert(tag);
    }
    tags
}

fn validate_draft(
    draft: Option<&Value>,
    published: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> bool {
    let draft = match draft {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            errors.push(FieldError::InvalidDraft {
                value: describe(other),
            });
            return false;
        }
    };

    // Hexo's `published` is the inverse of `draft`
    let published = match published {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            errors.push(FieldError::InvalidPublished {
                value: describe(other),
            });
            return false;
        }
    };

    match (draft, published) {
        (Some(draft), Some(published)) if draft == published => {
            errors.push(FieldError::ConflictingDraft { draft, published });
            false
        }
        (Some(draft), _) => draft,
        (None, Some(published)) => !published,
        (None, None) => false,
    }
}

fn validate_summary(value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::WrongType {
                key: "summary".to_string(),
                expected: "text",
            });
            None
        }
    }
}

/// Short human description of a YAML value for error messages
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{:?}", s),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(content: &str) -> Vec<FieldError> {
        match Post::parse(content) {
            Err(PostError::Invalid { errors }) => errors,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    const SAMPLE: &str = r#"---
title: "Casting size_t to int: what could go wrong?"
date: 2021-03-01 10:00:00 +08:00
tags: [c, casting, api-design]
draft: false
---
Casting is easy to get wrong.

```c
int len = (int)strlen(s);
```
"#;

    #[test]
    fn test_parse_post() {
        let post = Post::parse(SAMPLE).unwrap();
        assert_eq!(post.title, "Casting size_t to int: what could go wrong?");
        assert_eq!(post.date.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(post.tags.len(), 3);
        assert!(post.has_tag("casting"));
        assert!(!post.draft);
        assert!(post.body.starts_with("Casting is easy"));
        assert_eq!(post.outline().languages(), vec!["c"]);
    }

    #[test]
    fn test_draft_defaults_to_false() {
        let post = Post::parse("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\n---\n").unwrap();
        assert!(!post.draft);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_published_is_inverse_of_draft() {
        let post = Post::parse("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\npublished: false\n---\n")
            .unwrap();
        assert!(post.draft);

        let errors = field_errors(
            "---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ndraft: true\npublished: true\n---\n",
        );
        assert_eq!(
            errors,
            vec![FieldError::ConflictingDraft {
                draft: true,
                published: true
            }]
        );
    }

    #[test]
    fn test_draft_must_be_boolean() {
        for value in ["yes", "\"true\"", "1", ""] {
            let content = format!(
                "---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ndraft: {}\n---\n",
                value
            );
            let errors = field_errors(&content);
            assert!(
                matches!(errors.as_slice(), [FieldError::InvalidDraft { .. }]),
                "draft: {} gave {:?}",
                value,
                errors
            );
        }
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(
            field_errors("---\ndate: 2024-01-01T00:00:00Z\n---\n"),
            vec![FieldError::MissingTitle]
        );
        assert_eq!(
            field_errors("---\ntitle: '   '\ndate: 2024-01-01T00:00:00Z\n---\n"),
            vec![FieldError::EmptyTitle]
        );
        assert_eq!(
            field_errors("---\ntitle:\ndate: 2024-01-01T00:00:00Z\n---\n"),
            vec![FieldError::EmptyTitle]
        );

        let post = Post::parse("---\ntitle: '1.10'\ndate: 2024-01-01T00:00:00Z\n---\n").unwrap();
        assert_eq!(post.title, "1.10");
    }

    #[test]
    fn test_numbers_must_be_quoted() {
        for title in ["1.10", "2024", "0x1F"] {
            let content = format!("---\ntitle: {}\ndate: 2024-01-01T00:00:00Z\n---\n", title);
            assert!(
                matches!(
                    field_errors(&content).as_slice(),
                    [FieldError::WrongType { key, .. }] if key == "title"
                ),
                "title: {}",
                title
            );
        }

        let errors = field_errors("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ntags: [c, 0x1F, 1e3]\n---\n");
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, FieldError::WrongType { key, .. } if key == "tags")));

        let post = Post::parse("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ntags: ['0x1F', '1e3']\n---\n")
            .unwrap();
        assert_eq!(post.tags.iter().collect::<Vec<_>>(), vec!["0x1F", "1e3"]);
        let again = Post::parse(&post.to_markdown().unwrap()).unwrap();
        assert_eq!(again, post);
    }

    #[test]
    fn test_date_rules() {
        assert_eq!(
            field_errors("---\ntitle: t\n---\n"),
            vec![FieldError::MissingDate]
        );
        assert_eq!(
            field_errors("---\ntitle: t\ndate: 2024-01-01 10:00:00\n---\n"),
            vec![FieldError::MissingOffset {
                value: "2024-01-01 10:00:00".to_string()
            }]
        );
        assert_eq!(
            field_errors("---\ntitle: t\ndate: soon\n---\n"),
            vec![FieldError::InvalidDate {
                value: "soon".to_string()
            }]
        );
    }

    #[test]
    fn test_every_problem_is_reported() {
        let errors = field_errors("---\ntags: [ok, '']\ndraft: maybe\n---\n");
        assert_eq!(
            errors,
            vec![
                FieldError::MissingTitle,
                FieldError::MissingDate,
                FieldError::EmptyTag { index: 2 },
                FieldError::InvalidDraft {
                    value: "\"maybe\"".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_tags_are_a_set() {
        let parsed = Post::parse_with_warnings(
            "---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ntags: [c, api, c]\n---\n",
        )
        .unwrap();
        assert_eq!(parsed.post.tags.len(), 2);
        assert_eq!(parsed.warnings, vec![Warning::DuplicateTag("c".to_string())]);

        let reordered =
            Post::parse("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ntags: [api, c]\n---\n")
                .unwrap();
        assert_eq!(parsed.post, reordered);
    }

    #[test]
    fn test_single_string_tag() {
        let post =
            Post::parse("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ntags: Notes\n---\n").unwrap();
        assert_eq!(post.tags.iter().collect::<Vec<_>>(), vec!["Notes"]);
    }

    #[test]
    fn test_tags_wrong_type() {
        let errors = field_errors("---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ntags: {a: 1}\n---\n");
        assert!(matches!(
            errors.as_slice(),
            [FieldError::WrongType { key, .. }] if key == "tags"
        ));
    }

    #[test]
    fn test_unknown_keys_are_kept_and_warned() {
        let parsed = Post::parse_with_warnings(
            "---\ntitle: t\ndate: 2024-01-01T00:00:00Z\nlayout: post\nseries: casts\n---\n",
        )
        .unwrap();
        let keys: Vec<_> = parsed.post.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, ["layout", "series"]);
        assert_eq!(
            parsed.warnings,
            vec![
                Warning::UnknownKey("layout".to_string()),
                Warning::UnknownKey("series".to_string()),
            ]
        );
    }

    #[test]
    fn test_updated_before_date_warns() {
        let parsed = Post::parse_with_warnings(
            "---\ntitle: t\ndate: 2024-02-01T00:00:00Z\nupdated: 2024-01-01T00:00:00Z\n---\n",
        )
        .unwrap();
        assert_eq!(parsed.warnings, vec![Warning::UpdatedBeforeDate]);
    }

    #[test]
    fn test_round_trip() {
        let post = Post::parse(SAMPLE).unwrap();
        let text = post.to_markdown().unwrap();
        assert_eq!(Post::parse(&text).unwrap(), post);
        // Canonical output is a fixed point
        assert_eq!(Post::parse(&text).unwrap().to_markdown().unwrap(), text);
    }

    #[test]
    fn test_round_trip_keeps_extras_and_summary() {
        let content = "---\ntitle: 'true'\ndate: 2020-05-05 05:05 -03:00\nupdated: 2020-06-01T00:00:00-03:00\nsummary: Short\nseries:\n  name: casts\n  part: 2\n---\n\nBody with a leading blank line.\n";
        let post = Post::parse(content).unwrap();
        assert_eq!(post.title, "true");
        let again = Post::parse(&post.to_markdown().unwrap()).unwrap();
        assert_eq!(again, post);
        assert_eq!(again.body, "\nBody with a leading blank line.\n");
        assert_eq!(again.date.offset(), post.date.offset());
    }

    #[test]
    fn test_canonical_key_order() {
        let mut post = Post::new(
            "Checked conversions",
            helpers::parse_timestamp("2022-09-10T08:00:00+02:00").unwrap(),
        );
        post.draft = true;
        post.body = "Body\n".to_string();
        let text = post.to_markdown().unwrap();
        let keys: Vec<&str> = text
            .lines()
            .skip(1)
            .take_while(|line| *line != "---")
            .filter_map(|line| line.split(':').next())
            .collect();
        assert_eq!(keys, ["title", "date", "tags", "draft"]);
        assert!(text.starts_with("---\ntitle: Checked conversions\n"));
        assert!(text.contains("\ntags: []\ndraft: true\n"));
        assert!(text.ends_with("\n---\nBody\n"));
    }

    #[test]
    fn test_publish() {
        let mut post = Post::parse(
            "---\ntitle: t\ndate: 2024-01-01T00:00:00Z\ndraft: true\n---\n",
        )
        .unwrap();
        let when = helpers::parse_timestamp("2024-03-01T09:00:00+01:00").unwrap();
        post.publish(Some(when));
        assert!(!post.draft);
        assert_eq!(post.date, when);
    }

    #[test]
    fn test_summary_fallbacks() {
        let mut post = Post::parse(SAMPLE).unwrap();
        assert_eq!(
            post.summary_or_excerpt().as_deref(),
            Some("Casting is easy to get wrong.")
        );

        post.body = "Lead in.\n<!-- more -->\nRest.".to_string();
        assert_eq!(post.summary_or_excerpt().as_deref(), Some("Lead in."));

        post.summary = Some("Hand written".to_string());
        assert_eq!(post.summary_or_excerpt().as_deref(), Some("Hand written"));
    }

    #[test]
    fn test_slug() {
        let post = Post::parse(SAMPLE).unwrap();
        assert_eq!(post.slug(), "casting-size-t-to-int-what-could-go-wrong");
    }
}
