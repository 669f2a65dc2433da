//! Fallback content for slots whose document could not be loaded
//!
//! The table is a YAML file keyed by collection, then slug:
//!
//! ```yaml
//! services:
//!   roofing:
//!     title: Roofing
//!     body: We repair and replace roofs.
//! ```
//!
//! The `body` field is Markdown and is rendered like a loaded document, so a
//! default record has the same shape as a real one.

use anyhow::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

use super::frontmatter::FrontMatter;
use super::markdown::MarkdownRenderer;
use super::record::{ContentPath, ContentRecord};

/// Default records, keyed by collection and slug
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct DefaultContent {
    entries: IndexMap<String, IndexMap<String, FrontMatter>>,
}

impl DefaultContent {
    /// Load the table from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let defaults = Self::from_yaml_str(&content)?;
        tracing::debug!(
            "Loaded default content for {} collections from {:?}",
            defaults.entries.len(),
            path.as_ref()
        );
        Ok(defaults)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Whether a default exists for this slot
    pub fn contains(&self, collection: &str, slug: &str) -> bool {
        self.entries
            .get(collection)
            .is_some_and(|docs| docs.contains_key(slug))
    }

    /// Build the default record for a slot
    pub fn get(
        &self,
        collection: &str,
        slug: &str,
        renderer: &MarkdownRenderer,
    ) -> Option<ContentRecord> {
        let mut fields = self.entries.get(collection)?.get(slug)?.clone();

        let raw_body = match fields.shift_remove("body") {
            Some(Value::String(body)) => body,
            None => String::new(),
            Some(other) => {
                tracing::warn!(
                    "Default content {}/{}: body is not a string, using empty: {:?}",
                    collection,
                    slug,
                    other
                );
                String::new()
            }
        };
        let body = renderer.render(&raw_body);

        Some(ContentRecord::new(
            &ContentPath::new(collection, slug),
            fields,
            raw_body,
            body,
        ))
    }
}
