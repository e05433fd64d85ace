//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Front-matter metadata of a post.
///
/// Fields are kept exactly as written (in order) so that they can be
/// re-emitted untouched in the JSON endpoints. Typed accessors cover the
/// handful of keys the generator itself cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta(Map<String, Value>);

impl Meta {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// Raw `date` field as written
    pub fn date_str(&self) -> Option<&str> {
        self.get("date").and_then(Value::as_str)
    }

    /// Parse the `date` field
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date_str().and_then(parse_date_string)
    }

    pub fn is_featured(&self) -> bool {
        self.flag("featured").unwrap_or(false)
    }

    /// `draft: true` or `published: false`
    pub fn is_draft(&self) -> bool {
        self.flag("draft").unwrap_or(false) || !self.flag("published").unwrap_or(true)
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

/// Front-matter splitter
pub struct Frontmatter;

impl Frontmatter {
    /// Split a document into its metadata and markdown body.
    ///
    /// Only a leading `---` block closed by a `---` line counts as
    /// front-matter; anything else is returned as body with empty metadata.
    pub fn parse(content: &str) -> Result<(Meta, &str), String> {
        let trimmed = content.trim_start_matches('\u{feff}');

        let Some(rest) = strip_delimiter_line(trimmed) else {
            return Ok((Meta::new(), trimmed));
        };

        let Some((yaml, body)) = split_at_closing_delimiter(rest) else {
            return Ok((Meta::new(), trimmed));
        };

        if yaml.trim().is_empty() {
            return Ok((Meta::new(), body));
        }

        let value: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| format!("invalid YAML: {}", e))?;

        match value {
            serde_yaml::Value::Mapping(_) => {}
            serde_yaml::Value::Null => return Ok((Meta::new(), body)),
            _ => return Err("front-matter must be a mapping of fields".to_string()),
        }

        let json = serde_json::to_value(&value).map_err(|e| e.to_string())?;
        match json {
            Value::Object(map) => Ok((Meta(map), body)),
            _ => Err("front-matter must be a mapping of fields".to_string()),
        }
    }
}

/// Strip an opening `---` line, returning what follows it
fn strip_delimiter_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let line_end = rest.find('\n').unwrap_or(rest.len());
    if !rest[..line_end].trim().is_empty() {
        return None;
    }
    Some(rest.get(line_end + 1..).unwrap_or(""))
}

/// Find the closing `---` line; returns (yaml, body)
fn split_at_closing_delimiter(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
featured: true
tags:
  - rust
  - svelte
---

This is the content.
"#;

        let (meta, body) = Frontmatter::parse(content).unwrap();
        assert_eq!(meta.title(), Some("Hello World"));
        assert_eq!(meta.date_str(), Some("2024-01-15"));
        assert!(meta.is_featured());
        assert_eq!(
            meta.get("tags"),
            Some(&serde_json::json!(["rust", "svelte"]))
        );
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_field_order_preserved() {
        let content = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\nbody";
        let (meta, _) = Frontmatter::parse(content).unwrap();
        let keys: Vec<_> = meta.as_map().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\nNo metadata here.";
        let (meta, body) = Frontmatter::parse(content).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let content = "---\ntitle: Dangling\n\nStill body.";
        let (meta, body) = Frontmatter::parse(content).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_horizontal_rule_is_not_frontmatter() {
        let content = "Intro\n\n---\n\nAfter the rule";
        let (meta, body) = Frontmatter::parse(content).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let (meta, body) = Frontmatter::parse("---\n---\nBody").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        assert!(Frontmatter::parse(content).is_err());
    }

    #[test]
    fn test_non_mapping_is_error() {
        let content = "---\n- just\n- a list\n---\nBody";
        let err = Frontmatter::parse(content).unwrap_err();
        assert!(err.contains("mapping"));
    }

    #[test]
    fn test_draft_flags() {
        let (meta, _) = Frontmatter::parse("---\ndraft: true\n---\n").unwrap();
        assert!(meta.is_draft());
        let (meta, _) = Frontmatter::parse("---\npublished: false\n---\n").unwrap();
        assert!(meta.is_draft());
        let (meta, _) = Frontmatter::parse("---\ntitle: Live\n---\n").unwrap();
        assert!(!meta.is_draft());
    }

    #[test]
    fn test_parse_dates() {
        let d = parse_date_string("2024-01-15").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 00:00");

        let d = parse_date_string("2024/01/15 10:30:00").unwrap();
        assert_eq!(d.format("%H:%M").to_string(), "10:30");

        let d = parse_date_string("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(d.format("%H:%M").to_string(), "08:30");

        assert!(parse_date_string("last tuesday").is_none());
    }
}
