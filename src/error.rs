//! Error and warning types for post records

use std::path::PathBuf;
use thiserror::Error;

/// A file-level failure: the post could not be read, split or validated.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: std::io::Error },

    #[error("missing front-matter: the first line must be `---` or `;;;`")]
    MissingFrontMatter,

    #[error("unterminated front-matter: no closing `{delimiter}` line")]
    UnterminatedFrontMatter { delimiter: &'static str },

    #[error("failed to parse YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("front-matter must be a mapping of keys to values")]
    NotAMapping,

    #[error("invalid front-matter: {}", join(.errors))]
    Invalid { errors: Vec<FieldError> },
}

impl PostError {
    /// Field errors carried by an `Invalid` error, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            PostError::Invalid { errors } => errors,
            _ => &[],
        }
    }
}

/// A single invalid or missing front-matter field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("`title` is required")]
    MissingTitle,

    #[error("`title` must not be empty")]
    EmptyTitle,

    #[error("`date` is required")]
    MissingDate,

    #[error("`date` value {value:?} is not a valid timestamp")]
    InvalidDate { value: String },

    #[error("`date` value {value:?} has no UTC offset")]
    MissingOffset { value: String },

    #[error("`updated` value {value:?} is not a valid timestamp with UTC offset")]
    InvalidUpdated { value: String },

    #[error("`draft` must be true or false, found {value}")]
    InvalidDraft { value: String },

    #[error("`published` must be true or false, found {value}")]
    InvalidPublished { value: String },

    #[error("`draft: {draft}` contradicts `published: {published}`")]
    ConflictingDraft { draft: bool, published: bool },

    #[error("tag #{index} is empty")]
    EmptyTag { index: usize },

    #[error("`{key}` must be {expected}")]
    WrongType { key: String, expected: &'static str },
}

/// A non-fatal observation about a post.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("unrecognised key `{0}`")]
    UnknownKey(String),

    #[error("duplicate tag `{0}` ignored")]
    DuplicateTag(String),

    #[error("`updated` is earlier than `date`")]
    UpdatedBeforeDate,
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
