//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Create a new post file and return its location
pub fn create_post(blog: &Blog, title: &str, featured: bool, path: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let name = match path {
        Some(p) => p.trim_matches('/').to_string(),
        None => slug::slugify(title),
    };
    if name.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let extension = blog
        .config
        .extensions
        .first()
        .map(|e| e.trim_start_matches('.').to_string())
        .unwrap_or_else(|| "md".to_string());
    let file_path = blog.content_dir.join(format!("{}.{}", name, extension));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut content = format!(
        "---\ntitle: {}\ndate: {}\n",
        serde_json::to_string(title)?,
        now.format("%Y-%m-%d")
    );
    if featured {
        content.push_str("featured: true\n");
    }
    content.push_str("---\n");

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Frontmatter;
    use tempfile::TempDir;

    #[test]
    fn test_create_post() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::new(tmp.path()).unwrap();

        let file = create_post(&blog, "Hello: A \"Quoted\" Title", true, None).unwrap();
        assert_eq!(file, blog.content_dir.join("hello-a-quoted-title.md"));

        let text = fs::read_to_string(&file).unwrap();
        let (meta, _) = Frontmatter::parse(&text).unwrap();
        assert_eq!(meta.title(), Some("Hello: A \"Quoted\" Title"));
        assert!(meta.date().is_some());
        assert!(meta.is_featured());

        assert!(create_post(&blog, "Hello: A \"Quoted\" Title", false, None).is_err());
    }

    #[test]
    fn test_create_post_at_path() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::new(tmp.path()).unwrap();

        let file = create_post(&blog, "Notes", false, Some("2024/notes")).unwrap();
        assert_eq!(file, blog.content_dir.join("2024/notes.md"));
        assert!(file.is_file());
    }
}
