//! Rewrite posts in canonical form

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::loader::ContentLoader;
use crate::content::Post;
use crate::error::PostError;
use crate::Blog;

/// Result of a formatting pass
#[derive(Debug, Default)]
pub struct FmtSummary {
    /// Files whose canonical form differs from what is on disk
    pub changed: Vec<PathBuf>,
    pub unchanged: usize,
    /// Files that are not valid posts and were left alone
    pub failed: Vec<(PathBuf, PostError)>,
}

/// Format `files`, or every post when empty. With `check_only`, nothing is written.
pub fn run(blog: &Blog, files: &[PathBuf], check_only: bool) -> Result<FmtSummary> {
    let mut summary = FmtSummary::default();
    let files = if files.is_empty() {
        let (files, failures) = ContentLoader::new(blog)?.post_files()?;
        summary
            .failed
            .extend(failures.into_iter().map(|f| (f.path, f.error)));
        files
    } else {
        files.iter().map(|f| blog.resolve_post_path(f)).collect()
    };

    for path in files {
        match format_file(&path, check_only) {
            Ok(true) => {
                if check_only {
                    println!("Would reformat {}", path.display());
                } else {
                    println!("Formatted {}", path.display());
                }
                summary.changed.push(path);
            }
            Ok(false) => summary.unchanged += 1,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                summary.failed.push((path, e));
            }
        }
    }

    Ok(summary)
}

/// Returns whether the file's canonical form differs from its contents
fn format_file(path: &Path, check_only: bool) -> Result<bool, PostError> {
    let original = fs::read_to_string(path).map_err(|source| PostError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let canonical = Post::parse(&original)?.to_markdown()?;

    if canonical == original {
        return Ok(false);
    }
    if !check_only {
        fs::write(path, &canonical).map_err(|source| PostError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(true)
}
