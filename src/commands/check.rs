//! Validate every post in the collection

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content::loader::{is_markdown_file, LoadReport};
use crate::content::TagIndex;
use crate::Blog;

/// How to run a check
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Treat warnings as errors
    pub strict: bool,
    /// Print a JSON report instead of text
    pub json: bool,
}

/// Outcome of one check pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSummary {
    pub checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub strict: bool,
    pub files: Vec<FileReport>,
    /// Problems that involve more than one post
    pub collection: Vec<String>,
}

/// Problems found in a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckSummary {
    /// Build from a load report
    pub fn from_report(report: &LoadReport, strict: bool) -> Self {
        let mut files = Vec::new();
        let mut errors = 0;

        for failure in &report.failures {
            let messages: Vec<String> = match failure.error.field_errors() {
                [] => vec![failure.error.to_string()],
                fields => fields.iter().map(ToString::to_string).collect(),
            };
            errors += messages.len();
            files.push(FileReport {
                source: failure.source.clone(),
                errors: messages,
                warnings: Vec::new(),
            });
        }

        for entry in report.entries.iter().filter(|e| !e.warnings.is_empty()) {
            files.push(FileReport {
                source: entry.source.clone(),
                errors: Vec::new(),
                warnings: entry.warnings.iter().map(ToString::to_string).collect(),
            });
        }
        files.sort_by(|a, b| a.source.cmp(&b.source));

        let collection = collection_warnings(report);
        let warnings = report.warning_count() + collection.len();

        Self {
            checked: report.entries.len() + report.failures.len(),
            errors,
            warnings,
            strict,
            files,
            collection,
        }
    }

    /// Whether the collection passes
    pub fn passed(&self) -> bool {
        self.errors == 0 && !(self.strict && self.warnings > 0)
    }

    /// Print as human-readable lines
    pub fn print_text(&self) {
        for file in &self.files {
            for error in &file.errors {
                println!("{}: error: {}", file.source, error);
            }
            for warning in &file.warnings {
                println!("{}: warning: {}", file.source, warning);
            }
        }
        for warning in &self.collection {
            println!("warning: {}", warning);
        }
        println!(
            "Checked {} {}: {} {}, {} {}",
            self.checked,
            plural(self.checked, "post", "posts"),
            self.errors,
            plural(self.errors, "error", "errors"),
            self.warnings,
            plural(self.warnings, "warning", "warnings"),
        );
    }
}

/// Run one check pass and print the result
pub fn run(blog: &Blog, options: &CheckOptions) -> Result<CheckSummary> {
    let report = blog.load()?;
    let summary = CheckSummary::from_report(&report, options.strict || blog.config.strict);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print_text();
    }

    Ok(summary)
}

/// Re-run the check whenever a post changes
pub async fn watch(blog: &Blog, options: CheckOptions) -> Result<()> {
    let blog = blog.clone();
    tokio::task::spawn_blocking(move || watch_blocking(&blog, &options)).await??;
    Ok(())
}

fn watch_blocking(blog: &Blog, options: &CheckOptions) -> Result<()> {
    if !blog.posts_dir.exists() {
        anyhow::bail!("Posts directory {:?} does not exist", blog.posts_dir);
    }

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;
    debouncer
        .watcher()
        .watch(&blog.posts_dir, RecursiveMode::Recursive)?;

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", blog.posts_dir);

    for result in rx {
        match result {
            Ok(events) => {
                if !events.iter().any(|e| is_markdown_file(&e.path)) {
                    continue;
                }
                tracing::info!("Posts changed, checking again...");
                if let Err(e) = run(blog, options) {
                    tracing::error!("Check failed: {}", e);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Warnings that only show up across posts
fn collection_warnings(report: &LoadReport) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut by_slug: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for entry in &report.entries {
        by_slug
            .entry(entry.post.slug())
            .or_default()
            .push(entry.source.as_str());
    }
    for (slug, mut sources) in by_slug {
        if sources.len() > 1 {
            sources.sort();
            warnings.push(format!(
                "posts {} share the slug `{}`",
                sources.join(", "),
                slug
            ));
        }
    }

    let tags = TagIndex::build(&report.entries);
    for (slug, names) in tags.slug_collisions() {
        warnings.push(format!(
            "tags {} share the slug `{}`",
            names
                .iter()
                .map(|n| format!("`{}`", n))
                .collect::<Vec<_>>()
                .join(", "),
            slug
        ));
    }

    warnings
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
