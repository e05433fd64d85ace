//! Listing selection: recent and featured posts

use std::cmp::Ordering;

use super::Post;
use crate::config::SiteConfig;

/// Sort posts newest first.
///
/// The sort is stable, so posts sharing a date keep their input order.
/// Posts without a parseable `date` go last.
pub fn sort_by_date_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| match (a.meta.date(), b.meta.date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// The `limit` most recent posts
pub fn recent_posts(posts: &[Post], limit: usize) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    sort_by_date_desc(&mut sorted);
    sorted.truncate(limit);
    sorted
}

/// Posts flagged `featured: true` or listed under `featured` in the config
pub fn featured_posts(posts: &[Post], config: &SiteConfig) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| p.meta.is_featured() || config.featured.iter().any(|f| f == &p.path))
        .cloned()
        .collect()
}
