//! Build the static site

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::prerender::{self, HttpErrorHandler};
use crate::Blog;

/// Load content, generate every page and check internal links
pub async fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let loader = ContentLoader::new(blog);
    let posts = loader.load_posts().await?;
    tracing::info!("Loaded {} posts from {:?}", posts.len(), blog.content_dir);

    // Output is recomputed from scratch; pages of deleted posts must not survive
    super::clean::run(blog)?;

    let generator = Generator::new(blog)?;
    let report = generator.generate(&posts)?;
    if !report.error_pages.is_empty() {
        tracing::warn!("Error pages written for: {:?}", report.error_pages);
    }

    let handler = HttpErrorHandler::new(&blog.config.prerender);
    prerender::check_links(&blog.public_dir, &handler)?;

    tracing::info!("Built in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Watch content, static files and config, rebuilding on change
pub async fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    // Bursts of events (write then rename, saves during a build) collapse
    // into one batch; batches queue up while a rebuild runs
    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            let _ = tx.send(res);
        },
    )?;

    for dir in [&blog.content_dir, &blog.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
        }
    }
    let config_path = blog.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    rebuild_on_change(blog, rx).await;
    Ok(())
}

/// Rebuild once per batch of changes until the channel closes, returning
/// the number of rebuilds attempted
async fn rebuild_on_change(
    blog: &Blog,
    mut rx: mpsc::UnboundedReceiver<DebounceEventResult>,
) -> usize {
    let config_path = blog.config_path();
    let mut current = blog.clone();
    let mut rebuilds = 0;

    while let Some(res) = rx.recv().await {
        let events = match res {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };
        if events.is_empty() {
            continue;
        }

        if events.iter().any(|e| e.path == config_path) {
            match Blog::new(&blog.base_dir) {
                Ok(reloaded) => current = reloaded,
                Err(e) => tracing::error!("Failed to reload config: {}", e),
            }
        }

        tracing::info!("{} file(s) changed, rebuilding...", events.len());
        rebuilds += 1;
        if let Err(e) = run(&current).await {
            tracing::error!("Build failed: {:#}", e);
        }
    }

    rebuilds
}
