//! Publish a draft

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::content::loader::{read_post, write_post};
use crate::content::Post;
use crate::{helpers, Blog};

/// Flip `draft` to false, optionally restamping the date with the current time.
/// Returns the path written and the updated post.
pub fn run(blog: &Blog, path: &Path, now: bool) -> Result<(PathBuf, Post)> {
    let path = blog.resolve_post_path(path);
    let mut post = read_post(&path)
        .with_context(|| format!("{:?} is not a valid post", path))?
        .post;

    if !post.draft && !now {
        tracing::info!("{:?} is already published", path);
        return Ok((path, post));
    }

    let date = if now {
        Some(helpers::now_in(&blog.config.timezone)?)
    } else {
        None
    };
    post.publish(date);
    write_post(&path, &post)?;
    tracing::info!("Published {:?}", path);

    Ok((path, post))
}
