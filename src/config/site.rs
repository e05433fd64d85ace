//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,

    // Directory
    pub content_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Writing
    /// File extensions treated as markdown content (without the dot)
    pub extensions: Vec<String>,
    pub render_drafts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Link prefixes rewritten inside markdown, e.g. `$static/logo.png`
    pub alias: BTreeMap<String, String>,

    // Listing
    pub recent_limit: usize,
    /// Post paths featured in addition to those with `featured: true`
    pub featured: Vec<String>,

    #[serde(default)]
    pub prerender: PrerenderConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut alias = BTreeMap::new();
        alias.insert("$static".to_string(), "/".to_string());
        alias.insert("$blog".to_string(), "/blog".to_string());

        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),

            content_dir: "src/content/pages".to_string(),
            static_dir: "static".to_string(),
            public_dir: "build".to_string(),

            extensions: vec!["md".to_string()],
            render_drafts: false,
            highlight: HighlightConfig::default(),

            alias,

            recent_limit: 3,
            featured: Vec::new(),

            prerender: PrerenderConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        if !config.extra.is_empty() {
            let mut keys: Vec<_> = config.extra.keys().collect();
            keys.sort();
            tracing::debug!("Unrecognized config keys: {:?}", keys);
        }
        Ok(config)
    }

    /// Whether a file extension is one of the configured markdown extensions
    pub fn is_content_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
    /// Language tag aliases, e.g. `svelte: html`
    pub languages: HashMap<String, String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
            languages: HashMap::new(),
        }
    }
}

/// Prerender link-check configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrerenderConfig {
    /// Broken links that must not fail the build
    pub ignore: Vec<IgnoredHttpError>,
}

/// A `(path, referrer)` pair whose HTTP error is deliberate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredHttpError {
    pub path: String,
    /// Matches any referrer when absent
    #[serde(default)]
    pub referrer: Option<String>,
}

impl IgnoredHttpError {
    pub fn matches(&self, path: &str, referrer: Option<&str>) -> bool {
        if self.path != path {
            return false;
        }
        match (&self.referrer, referrer) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (Some(_), None) => false,
        }
    }
}
