//! Content loader - loads posts from the posts directory

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Parsed, Post};
use crate::error::{PostError, Warning};
use crate::Blog;

lazy_static! {
    /// Hidden files, `_partials`, editor lock files and backups
    static ref IGNORED_NAME: Regex = Regex::new(r"^[._#]|~$").unwrap();
}

/// A successfully validated post and where it came from
#[derive(Debug, Clone)]
pub struct PostEntry {
    /// Path relative to the posts directory, with `/` separators
    pub source: String,
    pub path: PathBuf,
    pub post: Post,
    pub warnings: Vec<Warning>,
}

/// A file that could not be turned into a post
#[derive(Debug)]
pub struct LoadFailure {
    pub source: String,
    pub path: PathBuf,
    pub error: PostError,
}

/// Everything found in one pass over the posts directory
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Valid posts, newest first
    pub entries: Vec<PostEntry>,
    /// Files that failed to load, by source path
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn warning_count(&self) -> usize {
        self.entries.iter().map(|e| e.warnings.len()).sum()
    }

    pub fn published(&self) -> impl Iterator<Item = &PostEntry> {
        self.entries.iter().filter(|e| !e.post.draft)
    }

    pub fn drafts(&self) -> impl Iterator<Item = &PostEntry> {
        self.entries.iter().filter(|e| e.post.draft)
    }
}

/// Loads posts from the posts directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    exclude: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Result<Self> {
        let exclude = blog
            .config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("invalid exclude pattern {:?}", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { blog, exclude })
    }

    /// Load every post. Files that fail are reported, never fatal.
    pub fn load_all(&self) -> Result<LoadReport> {
        let (files, failures) = self.post_files()?;
        let mut report = LoadReport {
            failures,
            ..Default::default()
        };

        for path in files {
            match self.load_file(&path) {
                Ok(entry) => {
                    tracing::debug!(
                        "Loaded {} ({} warnings)",
                        entry.source,
                        entry.warnings.len()
                    );
                    report.entries.push(entry);
                }
                Err(error) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, error);
                    report.failures.push(LoadFailure {
                        source: self.source_of(&path),
                        path,
                        error,
                    });
                }
            }
        }

        // Sort by date descending (newest first)
        report.entries.sort_by(|a, b| {
            b.post
                .date
                .cmp(&a.post.date)
                .then_with(|| a.source.cmp(&b.source))
        });
        report.failures.sort_by(|a, b| a.source.cmp(&b.source));

        Ok(report)
    }

    /// Markdown files under the posts directory that are not excluded, plus
    /// the entries that could not be walked
    pub fn post_files(&self) -> Result<(Vec<PathBuf>, Vec<LoadFailure>)> {
        let posts_dir = &self.blog.posts_dir;
        if !posts_dir.exists() {
            tracing::debug!("Posts directory {:?} does not exist", posts_dir);
            return Ok((Vec::new(), Vec::new()));
        }

        let mut files = Vec::new();
        let mut failures = Vec::new();
        let walker = WalkDir::new(posts_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored_name(e.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if let Some(failure) = self.walk_failure(err) {
                        tracing::warn!("{}", failure.error);
                        failures.push(failure);
                    }
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }
            let source = self.source_of(path);
            if self.is_excluded(&source) {
                tracing::debug!("Excluded {}", source);
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok((files, failures))
    }

    /// Turn a walk error into a failure, or `None` when the entry would have
    /// been skipped anyway (dangling editor lock links and the like)
    fn walk_failure(&self, err: walkdir::Error) -> Option<LoadFailure> {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.blog.posts_dir.clone());
        let dangling_other = fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
            && !is_markdown_file(&path);
        if path != self.blog.posts_dir
            && (is_ignored_name(&path) || dangling_other || self.is_excluded(&self.source_of(&path)))
        {
            tracing::debug!("Skipping unreadable entry {:?}", path);
            return None;
        }
        let reason = match err.into_io_error() {
            Some(io) => io,
            None => io::Error::new(io::ErrorKind::Other, "filesystem loop"),
        };
        Some(LoadFailure {
            source: self.source_of(&path),
            path: path.clone(),
            error: PostError::Unreadable { path, reason },
        })
    }

    /// Load a single post, applying site configuration to its warnings
    pub fn load_file(&self, path: &Path) -> Result<PostEntry, PostError> {
        let Parsed { post, warnings } = read_post(path)?;
        let warnings = warnings
            .into_iter()
            .filter(|w| !matches!(w, Warning::UnknownKey(key) if self.blog.config.allows_key(key)))
            .collect();

        Ok(PostEntry {
            source: self.source_of(path),
            path: path.to_path_buf(),
            post,
            warnings,
        })
    }

    fn is_excluded(&self, source: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(source))
    }

    fn source_of(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.blog.posts_dir).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Read and validate a post file
pub fn read_post(path: &Path) -> Result<Parsed, PostError> {
    let content = fs::read_to_string(path).map_err(|source| PostError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Post::parse_with_warnings(&content)
}

/// Write a post in canonical form
pub fn write_post(path: &Path, post: &Post) -> Result<(), PostError> {
    let content = post.to_markdown()?;
    fs::write(path, content).map_err(|source| PostError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_ignored_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| IGNORED_NAME.is_match(n))
        .unwrap_or(false)
}
