//! Print a single post as JSON

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::content::loader::read_post;
use crate::content::{MarkdownOutline, Post};
use crate::Blog;

#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub slug: String,
    pub excerpt: Option<String>,
    pub outline: MarkdownOutline,
    pub warnings: Vec<String>,
}

/// Build the JSON view of the post at `path`
pub fn view(blog: &Blog, path: &Path) -> Result<PostView> {
    let path = blog.resolve_post_path(path);
    let parsed = read_post(&path).with_context(|| format!("{:?} is not a valid post", path))?;
    let post = parsed.post;

    Ok(PostView {
        slug: post.slug(),
        excerpt: post.summary_or_excerpt(),
        outline: post.outline(),
        warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
        post,
    })
}

pub fn run(blog: &Blog, path: &Path) -> Result<()> {
    let view = view(blog, path)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
