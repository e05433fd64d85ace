//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::content::select::{featured_posts, recent_posts};
use crate::content::Post;
use crate::Blog;

/// List posts by kind: all, featured or recent
pub async fn run(blog: &Blog, kind: &str) -> Result<()> {
    let posts = ContentLoader::new(blog).load_posts().await?;

    let (label, listed) = match kind {
        "post" | "posts" => ("Posts", posts),
        "featured" => ("Featured", featured_posts(&posts, &blog.config)),
        "recent" => ("Recent", recent_posts(&posts, blog.config.recent_limit)),
        _ => anyhow::bail!("Unknown type: {}. Available: posts, featured, recent", kind),
    };

    println!("{} ({}):", label, listed.len());
    for post in &listed {
        println!("  {}", describe(post));
    }

    Ok(())
}

fn describe(post: &Post) -> String {
    format!(
        "{} - {} [{}]",
        post.meta.date_str().unwrap_or("----------"),
        post.title(),
        post.path
    )
}
