//! Post model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Meta;

/// A blog post.
///
/// Only `meta` and `path` are part of the JSON endpoints; the remaining
/// fields live for the duration of a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Front-matter fields as written
    pub meta: Meta,

    /// URL segment derived from the file location, e.g. `2024/hello`
    pub path: String,

    /// Source file path
    #[serde(skip)]
    pub source: PathBuf,

    /// Raw markdown body (front-matter removed)
    #[serde(skip)]
    pub raw: String,

    /// Rendered HTML content
    #[serde(skip)]
    pub content: String,
}

impl Post {
    /// Create a post with only the endpoint fields set
    pub fn new(meta: Meta, path: impl Into<String>) -> Self {
        Self {
            meta,
            path: path.into(),
            source: PathBuf::new(),
            raw: String::new(),
            content: String::new(),
        }
    }

    /// Title from front-matter, falling back to the last path segment
    pub fn title(&self) -> &str {
        self.meta
            .title()
            .unwrap_or_else(|| self.path.rsplit('/').next().unwrap_or(&self.path))
    }

    /// Site-relative URL of the rendered post
    pub fn url(&self) -> String {
        format!("/blog/{}", self.path)
    }
}
