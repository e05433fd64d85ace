//! Clean the public directory

use anyhow::{bail, Result};
use std::fs;

use crate::Blog;

/// Delete the public directory
pub fn run(blog: &Blog) -> Result<()> {
    for source in [&blog.base_dir, &blog.content_dir, &blog.static_dir] {
        if source.starts_with(&blog.public_dir) {
            bail!(
                "Refusing to delete {:?}: it contains {:?}",
                blog.public_dir,
                source
            );
        }
    }

    if blog.public_dir.exists() {
        fs::remove_dir_all(&blog.public_dir)?;
        tracing::info!("Deleted: {:?}", blog.public_dir);
    }

    Ok(())
}
