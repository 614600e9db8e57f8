//! CLI entry point for postkit

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postkit::commands::check::CheckOptions;
use postkit::commands::new::NewPost;

#[derive(Parser)]
#[command(name = "postkit")]
#[command(version)]
#[command(about = "Parse, validate and maintain front-matter blog posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new post collection
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Tag to add (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Create as a draft
        #[arg(long)]
        draft: bool,

        /// Summary line
        #[arg(short, long)]
        summary: Option<String>,

        /// File name relative to the posts directory
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Validate every post
    #[command(alias = "c")]
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Print a JSON report
        #[arg(long)]
        json: bool,

        /// Keep running and check again when posts change
        #[arg(short, long)]
        watch: bool,
    },

    /// List site information
    List {
        /// Type of content to list (post, draft, all, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one post as JSON
    Show {
        /// Post file, absolute or relative to the posts directory
        file: PathBuf,
    },

    /// Rewrite posts in canonical form
    Fmt {
        /// Only report files that would change
        #[arg(long)]
        check: bool,

        /// Files to format (defaults to every post)
        files: Vec<PathBuf>,
    },

    /// Mark a draft as published
    Publish {
        /// Post file, absolute or relative to the posts directory
        file: PathBuf,

        /// Restamp the date with the current time
        #[arg(long)]
        now: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postkit=debug,info"
    } else {
        "postkit=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing post collection in {:?}", target_dir);
            postkit::commands::init::init_site(&target_dir)?;
            println!("Initialized post collection in {:?}", target_dir);
        }

        Commands::New {
            title,
            tags,
            draft,
            summary,
            path,
        } => {
            let blog = postkit::Blog::new(&base_dir)?;
            tracing::debug!("Creating new post with title: {}", title);
            let created = blog.new_post(&NewPost {
                title,
                tags,
                draft,
                summary,
                path,
            })?;
            println!("Created: {}", created.display());
        }

        Commands::Check {
            strict,
            json,
            watch,
        } => {
            let blog = postkit::Blog::new(&base_dir)?;
            let options = CheckOptions { strict, json };
            let summary = blog.check(&options)?;

            if watch {
                postkit::commands::check::watch(&blog, options).await?;
            } else if !summary.passed() {
                anyhow::bail!(
                    "check failed: {} error(s), {} warning(s)",
                    summary.errors,
                    summary.warnings
                );
            }
        }

        Commands::List { r#type, json } => {
            let blog = postkit::Blog::new(&base_dir)?;
            postkit::commands::list::run(&blog, &r#type, json)?;
        }

        Commands::Show { file } => {
            let blog = postkit::Blog::new(&base_dir)?;
            postkit::commands::show::run(&blog, &file)?;
        }

        Commands::Fmt { check, files } => {
            let blog = postkit::Blog::new(&base_dir)?;
            let summary = postkit::commands::fmt::run(&blog, &files, check)?;
            println!(
                "{} changed, {} unchanged, {} skipped",
                summary.changed.len(),
                summary.unchanged,
                summary.failed.len()
            );
            if !summary.failed.is_empty() {
                anyhow::bail!("{} file(s) are not valid posts", summary.failed.len());
            }
            if check && !summary.changed.is_empty() {
                anyhow::bail!("{} file(s) need formatting", summary.changed.len());
            }
        }

        Commands::Publish { file, now } => {
            let blog = postkit::Blog::new(&base_dir)?;
            let (path, post) = postkit::commands::publish::run(&blog, &file, now)?;
            println!(
                "Published {} ({})",
                path.display(),
                postkit::helpers::to_front_matter(&post.date)
            );
        }

        Commands::Version => {
            println!("postkit version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
