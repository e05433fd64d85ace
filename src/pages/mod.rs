//! Page-data loaders for the listing pages
//!
//! Both loaders read the generated JSON endpoints rather than the content
//! directory, so they see exactly what the endpoints publish. Every failure,
//! whatever its cause, becomes [`PageError::NotFound`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{DataSource, BLOG_ENDPOINT, FEATURED_ENDPOINT};
use crate::content::select::sort_by_date_desc;
use crate::content::Post;
use crate::error::PageError;

/// Data for the blog index page
#[derive(Debug, Clone, Serialize)]
pub struct BlogIndexData {
    pub all_blogs: Vec<Post>,
}

/// Data for the home page
#[derive(Debug, Clone, Serialize)]
pub struct HomeData {
    pub featured: Vec<Post>,
    pub recent_blogs: Vec<Post>,
}

/// Load every post for the blog index
pub fn load_blog_index<S: DataSource + ?Sized>(source: &S) -> Result<BlogIndexData, PageError> {
    let all_blogs = fetch_posts(source, BLOG_ENDPOINT)?;
    Ok(BlogIndexData { all_blogs })
}

/// Load the featured posts and the `recent_limit` newest posts
pub fn load_home<S: DataSource + ?Sized>(
    source: &S,
    recent_limit: usize,
) -> Result<HomeData, PageError> {
    let featured = fetch_posts(source, FEATURED_ENDPOINT)?;

    let mut recent_blogs = fetch_posts(source, BLOG_ENDPOINT)?;
    sort_by_date_desc(&mut recent_blogs);
    recent_blogs.truncate(recent_limit);

    Ok(HomeData {
        featured,
        recent_blogs,
    })
}

fn fetch_posts<S: DataSource + ?Sized>(source: &S, endpoint: &str) -> Result<Vec<Post>, PageError> {
    fetch_json(source, endpoint).map_err(|cause| {
        tracing::debug!("Loading {} failed: {}", endpoint, cause);
        PageError::not_found()
    })
}

fn fetch_json<T, S>(source: &S, endpoint: &str) -> Result<T, String>
where
    T: DeserializeOwned,
    S: DataSource + ?Sized,
{
    let response = source.fetch(endpoint).map_err(|e| e.to_string())?;
    if !response.is_ok() {
        return Err(format!("status {}", response.status));
    }
    response.json().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoints, Response};
    use crate::config::SiteConfig;
    use crate::content::Meta;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;

    /// Serves canned responses; anything else is unreachable
    struct Canned(HashMap<&'static str, Response>);

    impl DataSource for Canned {
        fn fetch(&self, endpoint: &str) -> io::Result<Response> {
            self.0.get(endpoint).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable")
            })
        }
    }

    fn post(path: &str, date: &str, featured: bool) -> Post {
        let mut meta = Meta::new();
        meta.insert("title", json!(path));
        meta.insert("date", json!(date));
        if featured {
            meta.insert("featured", json!(true));
        }
        Post::new(meta, path)
    }

    fn endpoints() -> Endpoints {
        let posts = vec![
            post("oldest", "2021-05-01", true),
            post("newest", "2024-09-09", false),
            post("middle", "2023-02-14", true),
            post("older", "2022-07-30", false),
        ];
        Endpoints::build(&posts, &SiteConfig::default()).unwrap()
    }

    fn paths(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_blog_index_lists_all_posts() {
        let data = load_blog_index(&endpoints()).unwrap();
        assert_eq!(
            paths(&data.all_blogs),
            vec!["oldest", "newest", "middle", "older"]
        );
    }

    #[test]
    fn test_home_featured_and_recent() {
        let data = load_home(&endpoints(), 3).unwrap();
        assert_eq!(paths(&data.featured), vec!["oldest", "middle"]);
        assert_eq!(paths(&data.recent_blogs), vec!["newest", "middle", "older"]);
    }

    #[test]
    fn test_missing_endpoints_are_not_found() {
        let empty = Endpoints::default();
        assert_eq!(load_blog_index(&empty).unwrap_err(), PageError::not_found());
        assert_eq!(load_home(&empty, 3).unwrap_err(), PageError::not_found());
    }

    #[test]
    fn test_home_requires_featured_endpoint() {
        let body = serde_json::to_vec(&vec![post("a", "2024-01-01", false)]).unwrap();
        let mut responses = HashMap::new();
        responses.insert(BLOG_ENDPOINT, Response::ok_with(body));
        responses.insert(FEATURED_ENDPOINT, Response::not_found());

        let source = Canned(responses);
        assert!(load_blog_index(&source).is_ok());
        let err = load_home(&source, 3).unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "Could not find blog posts");
    }

    #[test]
    fn test_unreachable_and_malformed_are_not_found() {
        let unreachable = Canned(HashMap::new());
        assert_eq!(
            load_blog_index(&unreachable).unwrap_err(),
            PageError::not_found()
        );

        let mut responses = HashMap::new();
        responses.insert(BLOG_ENDPOINT, Response::ok_with(b"{not json".to_vec()));
        responses.insert(FEATURED_ENDPOINT, Response::ok_with(b"[]".to_vec()));
        let malformed = Canned(responses);
        assert_eq!(
            load_blog_index(&malformed).unwrap_err(),
            PageError::not_found()
        );
        assert_eq!(load_home(&malformed, 3).unwrap_err(), PageError::not_found());
    }
}
