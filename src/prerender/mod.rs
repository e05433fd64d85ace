//! Prerender checks over the generated site
//!
//! Internal links are followed from the home page; every link that does
//! not resolve to a generated file is an HTTP error. Errors go through an
//! [`HttpErrorHandler`], which either ignores a deliberate broken link or
//! fails the build.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{IgnoredHttpError, PrerenderConfig};
use crate::error::{HttpError, PrerenderError};

/// What to do with an HTTP error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ignored,
    Fail,
}

/// Decides whether an HTTP error fails the build
#[derive(Debug, Clone, Default)]
pub struct HttpErrorHandler {
    ignore: Vec<IgnoredHttpError>,
}

impl HttpErrorHandler {
    pub fn new(config: &PrerenderConfig) -> Self {
        Self {
            ignore: config.ignore.clone(),
        }
    }

    pub fn disposition(&self, error: &HttpError) -> Disposition {
        let ignored = self
            .ignore
            .iter()
            .any(|entry| entry.matches(&error.path, error.referrer.as_deref()));
        if ignored {
            Disposition::Ignored
        } else {
            Disposition::Fail
        }
    }

    /// `Ok` if the error is ignored, otherwise the error itself
    pub fn handle(&self, error: HttpError) -> Result<(), PrerenderError> {
        match self.disposition(&error) {
            Disposition::Ignored => {
                tracing::debug!("Ignoring prerender error: {}", error);
                Ok(())
            }
            Disposition::Fail => Err(PrerenderError::Http(error)),
        }
    }
}

/// Summary of a link check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Routes visited
    pub pages: usize,
    /// Broken links that were ignored
    pub ignored: usize,
}

/// Follow internal links from `/` and report every target that is missing
pub fn check_links(
    public_dir: &Path,
    handler: &HttpErrorHandler,
) -> Result<LinkReport, PrerenderError> {
    let mut report = LinkReport::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut reported: HashSet<(String, String)> = HashSet::new();
    let mut queue: VecDeque<(String, Option<String>)> = VecDeque::new();
    queue.push_back(("/".to_string(), None));
    visited.insert("/".to_string());

    while let Some((route, referrer)) = queue.pop_front() {
        let Some(file) = resolve_route(public_dir, &route) else {
            // Only entry routes reach here; linked routes are checked before queueing
            handler.handle(HttpError {
                path: route,
                referrer,
                status: 404,
                message: "Not found".to_string(),
            })?;
            report.ignored += 1;
            continue;
        };
        report.pages += 1;

        if !is_html(&file) {
            continue;
        }

        let html = fs::read_to_string(&file).map_err(|source| PrerenderError::Io {
            path: file.clone(),
            source,
        })?;

        for link in extract_links(&html) {
            if resolve_route(public_dir, &link).is_none() {
                if reported.insert((link.clone(), route.clone())) {
                    handler.handle(HttpError {
                        path: link,
                        referrer: Some(route.clone()),
                        status: 404,
                        message: "Not found".to_string(),
                    })?;
                    report.ignored += 1;
                }
                continue;
            }
            if visited.insert(link.clone()) {
                queue.push_back((link, Some(route.clone())));
            }
        }
    }

    tracing::info!(
        "Checked links on {} pages ({} ignored errors)",
        report.pages,
        report.ignored
    );
    Ok(report)
}

/// Percent-decode a URL path into the route it names
pub fn decode_route(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Map a site route to the generated file serving it
pub fn resolve_route(public_dir: &Path, route: &str) -> Option<PathBuf> {
    let relative = route.trim_matches('/');
    if relative.split('/').any(|s| s == "..") {
        return None;
    }

    let base = public_dir.join(relative);
    let candidates = [
        base.clone(),
        base.join("index.html"),
        public_dir.join(format!("{}.html", relative)),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false)
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?:href|src)\s*=\s*["']([^"']*)["']"#).expect("valid link pattern")
    })
}

/// Site-internal link targets in a page, without query or fragment
fn extract_links(html: &str) -> Vec<String> {
    link_pattern()
        .captures_iter(html)
        .filter_map(|cap| {
            let raw = decode_entities(cap.get(1)?.as_str());
            if !raw.starts_with('/') || raw.starts_with("//") {
                return None;
            }
            let end = raw.find(['?', '#']).unwrap_or(raw.len());
            Some(decode_route(&raw[..end]))
        })
        .collect()
}

/// Undo the entity escaping templates apply to attribute values
fn decode_entities(s: &str) -> String {
    s.replace("&#x2F;", "/")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
