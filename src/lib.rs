//! postkit: parse, validate and maintain front-matter blog posts
//!
//! A post is a Markdown body preceded by a small metadata block:
//!
//! ```text
//! ---
//! title: Casting size_t to int
//! date: 2021-03-01T10:00:00+08:00
//! tags: [c, casting]
//! draft: false
//! ---
//! Body in Markdown.
//! ```
//!
//! This crate parses that record, enforces its invariants and writes it back
//! in a canonical form. Rendering the body is left to a site generator.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use content::Post;
pub use error::{FieldError, PostError, Warning};

/// Configuration file at the site root
pub const CONFIG_FILE: &str = "_config.yml";

/// A directory of posts plus its configuration
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Directory holding the posts
    pub posts_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build from an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let source_dir = base_dir.join(&config.source_dir);
        let posts_dir = source_dir.join(&config.posts_dir);

        Self {
            config,
            base_dir,
            source_dir,
            posts_dir,
        }
    }

    /// Load and validate every post
    pub fn load(&self) -> Result<content::loader::LoadReport> {
        content::loader::ContentLoader::new(self)?.load_all()
    }

    /// Validate every post and print the findings
    pub fn check(
        &self,
        options: &commands::check::CheckOptions,
    ) -> Result<commands::check::CheckSummary> {
        commands::check::run(self, options)
    }

    /// Create a new post
    pub fn new_post(&self, options: &commands::new::NewPost) -> Result<PathBuf> {
        commands::new::create_post(self, options)
    }

    /// Resolve a post path given on the command line: as-is if it exists,
    /// otherwise relative to the posts directory
    pub fn resolve_post_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        let candidate = self.posts_dir.join(path);
        if candidate.exists() || candidate.extension().is_some() {
            candidate
        } else {
            candidate.with_extension("md")
        }
    }
}
