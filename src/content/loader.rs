//! Content loader - discovers and parses posts under the content directory

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use super::{Frontmatter, MarkdownRenderer, Post};
use crate::config::SiteConfig;
use crate::error::ContentError;
use crate::Blog;

/// Loads posts from the content directory
pub struct ContentLoader {
    content_dir: PathBuf,
    config: SiteConfig,
    renderer: Arc<MarkdownRenderer>,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(blog: &Blog) -> Self {
        Self::with_renderer(
            &blog.content_dir,
            &blog.config,
            MarkdownRenderer::from_config(&blog.config),
        )
    }

    /// Create a loader with a custom markdown renderer
    pub fn with_renderer(
        content_dir: &Path,
        config: &SiteConfig,
        renderer: MarkdownRenderer,
    ) -> Self {
        Self {
            content_dir: content_dir.to_path_buf(),
            config: config.clone(),
            renderer: Arc::new(renderer),
        }
    }

    /// Load every post under the content directory.
    ///
    /// Files are read and rendered concurrently; the result is ordered by
    /// path. Any unreadable or malformed file fails the whole load.
    pub async fn load_posts(&self) -> Result<Vec<Post>, ContentError> {
        if !self.content_dir.exists() {
            tracing::debug!("Content directory {:?} does not exist", self.content_dir);
            return Ok(Vec::new());
        }

        let mut tasks = JoinSet::new();
        for (file, path) in self.discover()? {
            let renderer = Arc::clone(&self.renderer);
            tasks.spawn(async move { load_post(file, path, renderer).await });
        }

        let mut posts = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            posts.push(joined??);
        }

        posts.sort_by(|a, b| a.path.cmp(&b.path));
        check_unique_paths(&posts)?;

        let total = posts.len();
        if !self.config.render_drafts {
            posts.retain(|p| !p.meta.is_draft());
        }
        tracing::debug!(
            "Loaded {} posts ({} drafts skipped)",
            posts.len(),
            total - posts.len()
        );

        Ok(posts)
    }

    /// Enumerate content files with their derived paths.
    ///
    /// An entry the walk cannot read (dangling link, unreadable directory)
    /// is an error rather than a silently missing post.
    fn discover(&self) -> Result<Vec<(PathBuf, String)>, ContentError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.content_dir).follow_links(true) {
            let entry = entry.map_err(|e| ContentError::Read {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.content_dir.clone()),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() || !self.is_content_file(entry.path()) {
                continue;
            }
            if let Some(path) = post_path(&self.content_dir, entry.path()) {
                files.push((entry.into_path(), path));
            }
        }
        Ok(files)
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.config.is_content_extension(ext))
            .unwrap_or(false)
    }
}

/// Read, split and render a single file
async fn load_post(
    file: PathBuf,
    path: String,
    renderer: Arc<MarkdownRenderer>,
) -> Result<Post, ContentError> {
    let text = tokio::fs::read_to_string(&file)
        .await
        .map_err(|source| ContentError::Read {
            path: file.clone(),
            source,
        })?;

    let (meta, body) = Frontmatter::parse(&text).map_err(|message| ContentError::Frontmatter {
        path: file.clone(),
        message,
    })?;

    let content = renderer.render(body).map_err(|e| ContentError::Render {
        path: file.clone(),
        message: e.to_string(),
    })?;

    let mut post = Post::new(meta, path);
    post.raw = body.to_string();
    post.content = content;
    post.source = file;
    Ok(post)
}

/// Derive the URL segment for a content file: the path relative to the
/// content directory, extension removed, `/`-separated.
pub fn post_path(content_dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(content_dir).ok()?;
    let stem = relative.with_extension("");

    let segments: Vec<&str> = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments.join("/"))
}

fn check_unique_paths(posts: &[Post]) -> Result<(), ContentError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for post in posts {
        if let Some(first) = seen.insert(&post.path, &post.source) {
            return Err(ContentError::DuplicatePath {
                path: post.path.clone(),
                first: first.to_path_buf(),
                second: post.source.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn loader(dir: &Path, config: &SiteConfig) -> ContentLoader {
        ContentLoader::with_renderer(dir, config, MarkdownRenderer::from_config(config))
    }

    #[test]
    fn test_post_path() {
        let root = Path::new("/site/src/content/pages");
        assert_eq!(
            post_path(root, &root.join("hello.md")),
            Some("hello".to_string())
        );
        assert_eq!(
            post_path(root, &root.join("2024/01/release-notes.md")),
            Some("2024/01/release-notes".to_string())
        );
        assert_eq!(post_path(root, Path::new("/elsewhere/x.md")), None);
    }

    #[tokio::test]
    async fn test_one_post_per_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        write(dir, "first.md", "---\ntitle: First\ndate: 2024-01-01\n---\nOne");
        write(dir, "nested/second.md", "---\ntitle: Second\n---\n# Two");
        write(dir, "nested/deeper/third.md", "No front-matter at all");
        write(dir, "notes.txt", "not content");
        write(dir, "image.png", "binary-ish");

        let posts = loader(dir, &SiteConfig::default())
            .load_posts()
            .await
            .unwrap();

        let paths: Vec<_> = posts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["first", "nested/deeper/third", "nested/second"]);
        assert!(posts.iter().all(|p| !p.path.is_empty()));

        let second = posts.iter().find(|p| p.path == "nested/second").unwrap();
        assert_eq!(second.meta.title(), Some("Second"));
        assert!(second.content.contains("<h1>Two</h1>"));
        assert_eq!(second.raw, "# Two");
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let posts = loader(&tmp.path().join("absent"), &SiteConfig::default())
            .load_posts()
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_fails_load() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "good.md", "---\ntitle: Good\n---\nok");
        write(tmp.path(), "bad.md", "---\ntitle: [oops\n---\nbroken");

        let err = loader(tmp.path(), &SiteConfig::default())
            .load_posts()
            .await
            .unwrap_err();
        match err {
            ContentError::Frontmatter { path, .. } => assert!(path.ends_with("bad.md")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_entry_fails_load() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "ok.md", "---\ntitle: Ok\n---\nfine");
        std::os::unix::fs::symlink(tmp.path().join("missing.md"), tmp.path().join("ghost.md"))
            .unwrap();

        let err = loader(tmp.path(), &SiteConfig::default())
            .load_posts()
            .await
            .unwrap_err();
        match err {
            ContentError::Read { path, .. } => assert!(path.ends_with("ghost.md")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_paths_rejected() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "same.md", "a");
        write(tmp.path(), "same.markdown", "b");

        let mut config = SiteConfig::default();
        config.extensions = vec!["md".to_string(), "markdown".to_string()];
        let err = loader(tmp.path(), &config).load_posts().await.unwrap_err();
        assert!(matches!(err, ContentError::DuplicatePath { ref path, .. } if path == "same"));
    }

    #[tokio::test]
    async fn test_drafts_skipped_unless_enabled() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "live.md", "---\ntitle: Live\n---\n");
        write(tmp.path(), "wip.md", "---\ntitle: WIP\ndraft: true\n---\n");

        let mut config = SiteConfig::default();
        let posts = loader(tmp.path(), &config).load_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "live");

        config.render_drafts = true;
        let posts = loader(tmp.path(), &config).load_posts().await.unwrap();
        assert_eq!(posts.len(), 2);
    }
}
