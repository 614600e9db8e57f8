//! List posts, drafts and tags

use anyhow::Result;
use serde::Serialize;

use crate::content::loader::PostEntry;
use crate::content::TagIndex;
use crate::helpers::format_date;
use crate::Blog;

#[derive(Serialize)]
struct PostLine<'a> {
    source: &'a str,
    title: &'a str,
    date: String,
    tags: Vec<&'a str>,
    draft: bool,
}

impl<'a> PostLine<'a> {
    fn new(entry: &'a PostEntry) -> Self {
        Self {
            source: &entry.source,
            title: &entry.post.title,
            date: entry.post.date.to_rfc3339(),
            tags: entry.post.tags.iter().map(String::as_str).collect(),
            draft: entry.post.draft,
        }
    }
}

/// List site content by type
pub fn run(blog: &Blog, content_type: &str, json: bool) -> Result<()> {
    let report = blog.load()?;
    if !report.failures.is_empty() {
        tracing::warn!(
            "{} post(s) failed to load and are not listed; run `postkit check`",
            report.failures.len()
        );
    }

    match content_type {
        "post" | "posts" => {
            let posts: Vec<_> = report.published().collect();
            print_posts("Posts", &posts, blog, json)?;
        }
        "draft" | "drafts" => {
            let drafts: Vec<_> = report.drafts().collect();
            print_posts("Drafts", &drafts, blog, json)?;
        }
        "all" => {
            let all: Vec<_> = report.entries.iter().collect();
            print_posts("All posts", &all, blog, json)?;
        }
        "tag" | "tags" => {
            let tags = TagIndex::build(&report.entries);
            if json {
                println!("{}", serde_json::to_string_pretty(&tags.by_count())?);
            } else {
                println!("Tags ({}):", tags.len());
                for group in tags.by_count() {
                    println!("  {} ({})", group.name, group.count());
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, all, tag",
                content_type
            );
        }
    }

    Ok(())
}

fn print_posts(heading: &str, entries: &[&PostEntry], blog: &Blog, json: bool) -> Result<()> {
    if json {
        let lines: Vec<_> = entries.iter().map(|e| PostLine::new(e)).collect();
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    println!("{} ({}):", heading, entries.len());
    for entry in entries {
        let marker = if entry.post.draft { " (draft)" } else { "" };
        println!(
            "  {} - {}{} [{}]",
            format_date(&entry.post.date, &blog.config.date_format),
            entry.post.title,
            marker,
            entry.source
        );
    }
    Ok(())
}
