//! Error types shared across the build pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering and parsing content files
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid front-matter in {path:?}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error("{first:?} and {second:?} both map to path '{path}'")]
    DuplicatePath {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to render {path:?}: {message}")]
    Render { path: PathBuf, message: String },

    #[error("Loader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors returned by page-data loaders
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("{message}")]
    NotFound { status: u16, message: String },
}

impl PageError {
    /// Message shown for every listing failure
    pub const NOT_FOUND_MESSAGE: &'static str = "Could not find blog posts";

    pub fn not_found() -> Self {
        PageError::NotFound {
            status: 404,
            message: Self::NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            PageError::NotFound { status, .. } => *status,
        }
    }
}

/// An HTTP error hit while prerendering a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub path: String,
    /// Page that linked to `path`; `None` for entry routes
    pub referrer: Option<String>,
    pub status: u16,
    pub message: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.path)?;
        if let Some(referrer) = &self.referrer {
            write!(f, " (linked from {})", referrer)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Errors raised by the prerender step
#[derive(Error, Debug)]
pub enum PrerenderError {
    #[error("{0}")]
    Http(HttpError),

    #[error("Failed to read generated page {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = PageError::not_found();
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "Could not find blog posts");
    }

    #[test]
    fn test_http_error_message() {
        let err = HttpError {
            path: "/not-found".to_string(),
            referrer: Some("/blog/hello".to_string()),
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "404 /not-found (linked from /blog/hello): Not found"
        );

        let entry = HttpError {
            referrer: None,
            ..err
        };
        assert_eq!(
            PrerenderError::Http(entry).to_string(),
            "404 /not-found: Not found"
        );
    }
}
