//! JSON list endpoints and the sources page loaders fetch them from

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::select::featured_posts;
use crate::content::Post;

/// Full post list
pub const BLOG_ENDPOINT: &str = "api/blog.json";

/// Featured subset
pub const FEATURED_ENDPOINT: &str = "api/blog/featured.json";

/// Result of fetching an endpoint
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok_with(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Something page loaders can fetch endpoint data from
pub trait DataSource {
    /// Fetch an endpoint such as `api/blog.json`.
    ///
    /// A missing endpoint is a non-OK response, not an error; errors are
    /// reserved for the source itself being unreachable.
    fn fetch(&self, endpoint: &str) -> io::Result<Response>;
}

/// Generated endpoint bodies, keyed by endpoint path
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    files: BTreeMap<String, Vec<u8>>,
}

impl Endpoints {
    /// Serialize the post list and its featured subset
    pub fn build(posts: &[Post], config: &SiteConfig) -> serde_json::Result<Self> {
        let featured = featured_posts(posts, config);

        let mut files = BTreeMap::new();
        files.insert(BLOG_ENDPOINT.to_string(), serde_json::to_vec_pretty(posts)?);
        files.insert(
            FEATURED_ENDPOINT.to_string(),
            serde_json::to_vec_pretty(&featured)?,
        );

        tracing::debug!(
            "Built endpoints: {} posts, {} featured",
            posts.len(),
            featured.len()
        );
        Ok(Self { files })
    }

    pub fn get(&self, endpoint: &str) -> Option<&[u8]> {
        self.files.get(normalize(endpoint)).map(Vec::as_slice)
    }

    /// Write every endpoint below `public_dir`
    pub fn write(&self, public_dir: &Path) -> io::Result<()> {
        for (endpoint, body) in &self.files {
            let output_path = public_dir.join(endpoint);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, body)?;
            tracing::info!("Generated {}", endpoint);
        }
        Ok(())
    }
}

impl DataSource for Endpoints {
    fn fetch(&self, endpoint: &str) -> io::Result<Response> {
        Ok(match self.get(endpoint) {
            Some(body) => Response::ok_with(body.to_vec()),
            None => Response::not_found(),
        })
    }
}

/// Reads endpoints back from a built output directory
#[derive(Debug, Clone)]
pub struct PublicDir(pub PathBuf);

impl DataSource for PublicDir {
    fn fetch(&self, endpoint: &str) -> io::Result<Response> {
        match fs::read(self.0.join(normalize(endpoint))) {
            Ok(body) => Ok(Response::ok_with(body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Response::not_found()),
            Err(e) => Err(e),
        }
    }
}

fn normalize(endpoint: &str) -> &str {
    endpoint.trim_start_matches('/')
}
