//! Content module - post records, front-matter and loading

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod tags;

pub use frontmatter::{Format, FrontMatter};
pub use markdown::{first_paragraph, split_excerpt, CodeBlock, Heading, MarkdownOutline};
pub use post::{Parsed, Post, RECOGNISED_KEYS};
pub use tags::{TagGroup, TagIndex};
