//! CLI entry point for mdblog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdblog")]
#[command(version)]
#[command(about = "A static blog generator for markdown content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Mark the post as featured
        #[arg(short, long)]
        featured: bool,

        /// Path for the new post, relative to the content directory
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Build the static site
    #[command(alias = "b")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Disable file watching and live reload
        #[arg(long)]
        r#static: bool,
    },

    /// Delete the public folder
    Clean,

    /// List posts
    List {
        /// What to list (posts, featured, recent)
        #[arg(default_value = "posts")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdblog=debug,info"
    } else {
        "mdblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            mdblog::commands::init::init_site(&target_dir)?;
            println!("Initialized empty site in {:?}", target_dir);
        }

        Commands::New {
            title,
            featured,
            path,
        } => {
            let blog = mdblog::Blog::new(&base_dir)?;
            let file = mdblog::commands::new::create_post(&blog, &title, featured, path.as_deref())?;
            println!("Created: {:?}", file);
        }

        Commands::Build { watch } => {
            let blog = mdblog::Blog::new(&base_dir)?;
            tracing::info!("Building site...");
            blog.build().await?;
            println!("Built successfully!");

            if watch {
                mdblog::commands::build::watch(&blog).await?;
            }
        }

        Commands::Serve { port, ip, r#static } => {
            let blog = mdblog::Blog::new(&base_dir)?;
            tracing::info!("Building site...");
            blog.build().await?;
            mdblog::server::start(&blog, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let blog = mdblog::Blog::new(&base_dir)?;
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = mdblog::Blog::new(&base_dir)?;
            mdblog::commands::list::run(&blog, &r#type).await?;
        }
    }

    Ok(())
}
