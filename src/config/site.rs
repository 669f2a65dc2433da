//! Loader configuration (cms.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Where content is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Fetch over HTTP from `base_url`
    Http,
    /// Read from `content_dir` on disk
    Local,
}

/// Main loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    // Source
    pub source: SourceKind,
    pub base_url: String,
    pub content_dir: String,

    // Layout
    pub extension: String,
    pub settings_path: String,
    pub defaults_file: Option<String>,

    // Cache
    /// Time-to-live of cached entries, in seconds
    pub cache_ttl: u64,

    // Rendering
    #[serde(default)]
    pub render: RenderConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Local,
            base_url: "http://localhost:4000/content".to_string(),
            content_dir: "content".to_string(),

            extension: "md".to_string(),
            settings_path: "settings/global.yml".to_string(),
            defaults_file: None,

            cache_ttl: 300,

            render: RenderConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl CmsConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: CmsConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Cache TTL as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// When false, bodies are passed through as plain text
    pub markdown: bool,
    pub highlight: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markdown: true,
            highlight: true,
            line_number: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
