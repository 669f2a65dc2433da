//! CLI entry point for sitecms

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sitecms")]
#[command(version)]
#[command(about = "Load, preview and serve headless-CMS website content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to cms.yml in the base directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a single document as JSON
    Show {
        /// Collection name (e.g. services)
        collection: String,

        /// Document slug
        slug: String,

        /// Print only the rendered HTML body
        #[arg(long)]
        html: bool,
    },

    /// List the active documents of a collection
    #[command(alias = "ls")]
    List {
        /// Collection name
        collection: String,
    },

    /// Show the global settings as JSON
    Settings,

    /// Create a new document
    New {
        /// Collection to create the document in
        collection: String,

        /// Title of the new document
        title: String,
    },

    /// Serve the local content directory over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "sitecms=debug,info"
    } else {
        "sitecms=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let load = || sitecms::Cms::with_config_file(&base_dir, cli.config.as_deref());

    match cli.command {
        Commands::Show {
            collection,
            slug,
            html,
        } => {
            let cms = load()?;
            sitecms::commands::show::run(&cms, &collection, &slug, html).await?;
        }

        Commands::List { collection } => {
            let cms = load()?;
            sitecms::commands::list::run(&cms, &collection).await?;
        }

        Commands::Settings => {
            let cms = load()?;
            sitecms::commands::settings::run(&cms).await?;
        }

        Commands::New { collection, title } => {
            tracing::info!("Creating new document in {} with title: {}", collection, title);
            let cms = load()?;
            sitecms::commands::new::run(&cms, &collection, &title)?;
        }

        Commands::Serve { port, ip } => {
            tracing::info!("Starting content server at http://{}:{}", ip, port);
            let cms = load()?;
            sitecms::server::start(&cms, &ip, port).await?;
        }

        Commands::Version => {
            println!("sitecms version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
