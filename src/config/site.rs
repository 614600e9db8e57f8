//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub timezone: String,

    // Directory
    pub source_dir: String,
    pub posts_dir: String,
    pub exclude: Vec<String>,

    // Writing
    pub new_post_name: String,
    pub date_format: String,

    // Validation
    pub allowed_keys: Vec<String>,
    pub strict: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            timezone: String::new(),

            source_dir: "source".to_string(),
            posts_dir: "_posts".to_string(),
            exclude: Vec::new(),

            new_post_name: ":title.md".to_string(),
            date_format: "YYYY-MM-DD".to_string(),

            allowed_keys: Vec::new(),
            strict: false,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        // An empty file is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Whether a non-standard front-matter key is explicitly allowed
    pub fn allows_key(&self, key: &str) -> bool {
        self.allowed_keys.iter().any(|k| k == key)
    }

    /// Expand `new_post_name` for a slug and date
    pub fn post_file_name<Tz: chrono::TimeZone>(
        &self,
        slug: &str,
        date: &chrono::DateTime<Tz>,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let name = self
            .new_post_name
            .replace(":year", &date.format("%Y").to_string())
            .replace(":month", &date.format("%m").to_string())
            .replace(":day", &date.format("%d").to_string())
            .replace(":i_month", &date.format("%-m").to_string())
            .replace(":i_day", &date.format("%-d").to_string())
            // Last, so text in the slug is never expanded
            .replace(":title", slug);
        if name.ends_with(".md") || name.ends_with(".markdown") {
            name
        } else {
            format!("{}.md", name)
        }
    }
}

/// Default `_config.yml` written by `postkit init`
pub const DEFAULT_CONFIG: &str = r#"# postkit configuration

# Site
title: Blog
# IANA zone used to stamp new posts; empty means the local zone
timezone: ''

# Directory
source_dir: source
posts_dir: _posts
# Glob patterns, relative to the posts directory, that are never loaded
exclude: []

# Writing
new_post_name: :title.md
date_format: YYYY-MM-DD

# Validation
# Extra front-matter keys that should not produce warnings
allowed_keys: []
# Treat warnings as errors in `postkit check`
strict: false
"#;
