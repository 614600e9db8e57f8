//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::loader::{is_markdown_file, write_post};
use crate::content::Post;
use crate::{helpers, Blog};

/// Options for a new post
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub summary: Option<String>,
    /// File name relative to the posts directory; `.md` is added when it has
    /// no Markdown extension
    pub path: Option<String>,
}

/// Create a new post stamped with the current time
pub fn create_post(blog: &Blog, options: &NewPost) -> Result<PathBuf> {
    let title = options.title.trim();
    if title.is_empty() {
        anyhow::bail!("A post needs a non-empty title");
    }

    let now = helpers::now_in(&blog.config.timezone)?;
    let mut post = Post::new(title, now);
    post.draft = options.draft;
    post.summary = options
        .summary
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    for tag in &options.tags {
        let tag = tag.trim();
        if tag.is_empty() {
            anyhow::bail!("Tags must not be empty");
        }
        post.tags.insert(tag.to_string());
    }
    post.body = "\n".to_string();

    let filename = match &options.path {
        Some(p) if is_markdown_file(Path::new(p)) => p.clone(),
        Some(p) => format!("{}.md", p),
        None => {
            let slug = post.slug();
            if slug.is_empty() {
                anyhow::bail!("Cannot derive a file name from title {:?}; pass --path", title);
            }
            blog.config.post_file_name(&slug, &now)
        }
    };

    let file_path = blog.posts_dir.join(filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    write_post(&file_path, &post)?;
    tracing::info!("Created {:?}", file_path);

    Ok(file_path)
}
