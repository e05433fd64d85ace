//! Generator module - writes the static site using the built-in Tera templates

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::Context;
use walkdir::WalkDir;

use crate::api::{Endpoints, PublicDir};
use crate::content::Post;
use crate::error::{HttpError, PageError};
use crate::pages::{load_blog_index, load_home};
use crate::prerender::HttpErrorHandler;
use crate::templates::{SiteData, TemplateRenderer};
use crate::Blog;

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    handler: HttpErrorHandler,
}

/// What a generation run produced
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub pages: usize,
    /// Routes rendered as error pages because their loader failed
    pub error_pages: Vec<String>,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
            handler: HttpErrorHandler::new(&blog.config.prerender),
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post]) -> Result<GenerateReport> {
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)?;

        self.copy_static_assets()?;

        let endpoints = Endpoints::build(posts, &self.blog.config)?;
        endpoints.write(public_dir)?;

        // Listing pages read the endpoints back from the output directory
        let source = PublicDir(public_dir.clone());
        let mut report = GenerateReport::default();

        let home = load_home(&source, self.blog.config.recent_limit);
        self.write_page("/", "home.html", home, &mut report)?;

        let index = load_blog_index(&source);
        self.write_page("/blog", "blog.html", index, &mut report)?;

        for post in posts {
            self.generate_post_page(post)?;
            report.pages += 1;
        }

        self.generate_not_found_page()?;

        tracing::info!(
            "Generated {} pages into {:?}",
            report.pages,
            self.blog.public_dir
        );
        Ok(report)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(&self.blog.config));
        context.insert("current_year", &chrono::Local::now().year());
        context
    }

    /// Render a listing page from its loader result.
    ///
    /// A loader error is an HTTP error for the route: unless the prerender
    /// settings ignore it, the build fails; if ignored, the error page is
    /// written in place of the listing.
    fn write_page<T: Serialize>(
        &self,
        route: &str,
        template: &str,
        data: Result<T, PageError>,
        report: &mut GenerateReport,
    ) -> Result<()> {
        let html = match data {
            Ok(data) => {
                let mut context = self.base_context();
                context.extend(Context::from_serialize(&data)?);
                self.renderer.render(template, &context)?
            }
            Err(err) => {
                self.handler.handle(HttpError {
                    path: route.to_string(),
                    referrer: None,
                    status: err.status(),
                    message: err.to_string(),
                })?;
                tracing::warn!("Rendering error page for {}: {}", route, err);
                report.error_pages.push(route.to_string());
                self.render_error(err.status(), &err.to_string())?
            }
        };

        self.write_route(route, html)?;
        report.pages += 1;
        Ok(())
    }

    fn generate_post_page(&self, post: &Post) -> Result<()> {
        let mut context = self.base_context();
        context.insert("post", post);
        context.insert("title", post.title());
        context.insert("content", &post.content);

        let html = self.renderer.render("post.html", &context)?;
        self.write_route(&post.url(), html)
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self.render_error(404, "Not found")?;
        let output_path = self.blog.public_dir.join("404.html");
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    fn render_error(&self, status: u16, message: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("status", &status);
        context.insert("message", message);
        self.renderer.render("error.html", &context)
    }

    /// Write `html` as `<route>/index.html`
    fn write_route(&self, route: &str, html: String) -> Result<()> {
        let output_path = self.route_path(route);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    fn route_path(&self, route: &str) -> PathBuf {
        let relative = route.trim_matches('/');
        if relative.is_empty() {
            self.blog.public_dir.join("index.html")
        } else {
            self.blog.public_dir.join(relative).join("index.html")
        }
    }

    /// Copy static assets (images, etc.) to the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IgnoredHttpError;
    use crate::content::Meta;
    use serde_json::json;
    use tempfile::TempDir;

    fn blog(dir: &std::path::Path) -> Blog {
        Blog::new(dir).unwrap()
    }

    fn post(path: &str, date: &str, featured: bool) -> Post {
        let mut meta = Meta::new();
        meta.insert("title", json!(format!("Post {}", path)));
        meta.insert("date", json!(date));
        if featured {
            meta.insert("featured", json!(true));
        }
        let mut post = Post::new(meta, path);
        post.content = format!("<p>Body of {}</p>", path);
        post
    }

    #[test]
    fn test_generate_site() {
        let tmp = TempDir::new().unwrap();
        let blog = blog(tmp.path());
        fs::create_dir_all(blog.static_dir.join("img")).unwrap();
        fs::write(blog.static_dir.join("img/logo.svg"), "<svg/>").unwrap();

        let posts = vec![
            post("alpha", "2024-01-01", true),
            post("beta", "2024-03-01", false),
            post("gamma", "2023-06-01", false),
            post("2022/delta", "2022-02-02", false),
        ];

        let report = Generator::new(&blog).unwrap().generate(&posts).unwrap();
        assert_eq!(report.pages, 6);
        assert!(report.error_pages.is_empty());

        let public = &blog.public_dir;
        for file in [
            "index.html",
            "404.html",
            "blog/index.html",
            "blog/alpha/index.html",
            "blog/2022/delta/index.html",
            "api/blog.json",
            "api/blog/featured.json",
            "img/logo.svg",
        ] {
            assert!(public.join(file).is_file(), "missing {}", file);
        }

        let home = fs::read_to_string(public.join("index.html")).unwrap();
        let featured_at = home.find("Recent posts").unwrap();
        let (featured, recent) = home.split_at(featured_at);
        assert!(featured.contains("Post alpha"));
        assert!(recent.contains("Post beta"));
        assert!(recent.contains("Post alpha"));
        assert!(recent.contains("Post gamma"));
        assert!(!recent.contains("Post 2022"));

        let post_page = fs::read_to_string(public.join("blog/beta/index.html")).unwrap();
        assert!(post_page.contains("<p>Body of beta</p>"));
    }

    #[test]
    fn test_loader_error_fails_build() {
        let tmp = TempDir::new().unwrap();
        let blog = blog(tmp.path());
        let generator = Generator::new(&blog).unwrap();

        let err = generator
            .write_page::<()>("/", "home.html", Err(PageError::not_found()), &mut GenerateReport::default())
            .unwrap_err();
        assert!(err.to_string().contains("Could not find blog posts"));
    }

    #[test]
    fn test_ignored_loader_error_writes_error_page() {
        let tmp = TempDir::new().unwrap();
        let mut blog = blog(tmp.path());
        blog.config.prerender.ignore.push(IgnoredHttpError {
            path: "/blog".to_string(),
            referrer: None,
        });
        let generator = Generator::new(&blog).unwrap();

        let mut report = GenerateReport::default();
        generator
            .write_page::<()>("/blog", "blog.html", Err(PageError::not_found()), &mut report)
            .unwrap();
        assert_eq!(report.error_pages, vec!["/blog"]);

        let html = fs::read_to_string(blog.public_dir.join("blog/index.html")).unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("Could not find blog posts"));
    }
}
