//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::CONFIG_FILE;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    let defaults = SiteConfig::default();
    let content_dir = target_dir.join(&defaults.content_dir);
    fs::create_dir_all(&content_dir)?;
    fs::create_dir_all(target_dir.join(&defaults.static_dir))?;

    let config_content = r#"# Site
title: My Blog
description: ''
author: John Doe
language: en
url: http://example.com

# Directory
content_dir: src/content/pages
static_dir: static
public_dir: build

# Writing
extensions: [md]
render_drafts: false
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: false
  languages:
    svelte: html

# Link prefixes usable inside markdown
alias:
  $static: /
  $blog: /blog

# Listing
recent_limit: 3
featured: []

# Broken links that should not fail the build
prerender:
  ignore: []
"#;
    fs::write(&config_path, config_content)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
featured: true
description: Your very first post.
---

Welcome! Posts live in `{}`. Each markdown file becomes a page under `/blog/`.

```bash
$ mdblog new "My New Post"
$ mdblog serve
```
"#,
        now.format("%Y-%m-%d"),
        defaults.content_dir
    );
    fs::write(content_dir.join("hello-world.md"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;
    use tempfile::TempDir;

    #[test]
    fn test_init_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let blog = Blog::new(tmp.path()).unwrap();
        assert_eq!(blog.config.title, "My Blog");
        assert_eq!(blog.config.alias.get("$blog"), Some(&"/blog".to_string()));
        assert!(blog.content_dir.join("hello-world.md").is_file());
        assert!(blog.static_dir.is_dir());

        // Refuses to overwrite an existing site
        assert!(init_site(tmp.path()).is_err());
    }
}
