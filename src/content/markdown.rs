//! Markdown body inspection
//!
//! Bodies are never rendered here. The outline only catalogues what a
//! renderer would later have to deal with: headings, fenced code and prose.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

const MORE_MARKER: &str = "<!-- more -->";

/// A code fragment quoted in a post body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Info string language, if any (`c`, `rust`, ...)
    pub lang: Option<String>,
    pub lines: usize,
}

/// A heading in a post body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// Structural summary of a Markdown body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkdownOutline {
    pub headings: Vec<Heading>,
    pub code_blocks: Vec<CodeBlock>,
    pub words: usize,
}

impl MarkdownOutline {
    /// Walk the Markdown event stream of `body`
    pub fn from_body(body: &str) -> Self {
        let mut outline = MarkdownOutline::default();

        let mut heading: Option<(u8, String)> = None;
        let mut code: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(body, parser_options()) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some((heading_level(level), String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = heading.take() {
                        outline.headings.push(Heading {
                            level,
                            text: text.trim().to_string(),
                        });
                    }
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|l| !l.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, text)) = code.take() {
                        outline.code_blocks.push(CodeBlock {
                            lang,
                            lines: text.lines().count(),
                        });
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                        continue;
                    }
                    if let Some((_, buf)) = heading.as_mut() {
                        buf.push_str(&text);
                    }
                    outline.words += text.split_whitespace().count();
                }
                _ => {}
            }
        }

        outline
    }

    /// Distinct code languages in order of first appearance
    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = Vec::new();
        for lang in self.code_blocks.iter().filter_map(|c| c.lang.as_deref()) {
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        langs
    }
}

/// Parse excerpt from content (split by <!-- more -->)
pub fn split_excerpt(content: &str) -> Option<&str> {
    content
        .find(MORE_MARKER)
        .map(|pos| content[..pos].trim())
        .filter(|excerpt| !excerpt.is_empty())
}

/// Plain text of the first paragraph of `body`, used when a post has no summary
pub fn first_paragraph(body: &str) -> Option<String> {
    let mut in_paragraph = false;
    let mut text = String::new();

    for event in Parser::new_ext(body, parser_options()) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                in_paragraph = false;
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    None
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
