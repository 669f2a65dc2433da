//! sitecms: content loading for a headless-CMS driven website
//!
//! Documents are Markdown files with YAML front-matter, grouped into
//! collections (`services`, `portfolio`, ...), plus one global settings file.
//! They are fetched over HTTP or read from disk, rendered to HTML and cached
//! in memory for a few minutes.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;
pub mod source;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{CmsConfig, SourceKind};
use content::{ContentCache, ContentLoader, DefaultContent, MarkdownRenderer};
use source::{DirectoryLister, Fetcher, HttpSource, LocalSource};

/// Default configuration file name
pub const CONFIG_FILE: &str = "cms.yml";

/// A content session: configuration plus a loader with its own cache
pub struct Cms {
    /// Loader configuration
    pub config: CmsConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Local content directory
    pub content_dir: PathBuf,
    /// Content loader
    pub loader: ContentLoader,
}

impl Cms {
    /// Create a session from a directory, reading `cms.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        Self::with_config_file(base_dir, None)
    }

    /// Create a session, reading configuration from `config_path` when given
    pub fn with_config_file<P: AsRef<Path>>(base_dir: P, config_path: Option<&Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base_dir.join(CONFIG_FILE));

        let config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            CmsConfig::load(&config_path)?
        } else {
            CmsConfig::default()
        };

        Self::from_config(base_dir, config)
    }

    /// Create a session from an already loaded configuration
    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: CmsConfig) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);

        let (fetcher, lister): (Arc<dyn Fetcher>, Arc<dyn DirectoryLister>) = match config.source {
            SourceKind::Http => {
                let source = Arc::new(HttpSource::new(&config.base_url));
                (source.clone() as Arc<dyn Fetcher>, source as Arc<dyn DirectoryLister>)
            }
            SourceKind::Local => {
                let source = Arc::new(LocalSource::new(&content_dir));
                (source.clone() as Arc<dyn Fetcher>, source as Arc<dyn DirectoryLister>)
            }
        };

        let cache = Arc::new(ContentCache::new(config.ttl()));
        let renderer = Arc::new(MarkdownRenderer::from_config(&config.render));

        let mut loader = ContentLoader::new(fetcher, lister, cache)
            .with_renderer(renderer)
            .with_extension(&config.extension)
            .with_settings_path(&config.settings_path);

        if let Some(defaults_file) = &config.defaults_file {
            loader = loader.with_defaults(DefaultContent::load(base_dir.join(defaults_file))?);
        }

        Ok(Self {
            config,
            base_dir,
            content_dir,
            loader,
        })
    }

    /// Drop all cached content
    pub fn clear_cache(&self) {
        self.loader.clear_cache()
    }
}
