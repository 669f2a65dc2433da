//! Content records and paths

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

use super::frontmatter::{parse_date_string, FrontMatter};

/// Field names filled in by the loader; front-matter keys with these names are overwritten
pub const RESERVED_FIELDS: [&str; 4] = ["body", "rawBody", "collection", "slug"];

/// Identifies one document: a collection and a slug within it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentPath {
    pub collection: String,
    pub slug: String,
}

impl ContentPath {
    pub fn new(collection: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            slug: slug.into(),
        }
    }

    /// Source path relative to the content root, e.g. `services/roofing.md`
    pub fn file_path(&self, extension: &str) -> String {
        format!("{}/{}.{}", self.collection, self.slug, extension)
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.slug)
    }
}

/// A loaded document: its front-matter fields plus the derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Custom front-matter fields, in source order
    #[serde(flatten)]
    pub fields: FrontMatter,

    /// Rendered HTML body
    pub body: String,

    /// Markdown body as written
    #[serde(rename = "rawBody")]
    pub raw_body: String,

    pub collection: String,

    pub slug: String,
}

impl ContentRecord {
    /// Merge front-matter with the derived fields.
    ///
    /// Front-matter keys named like a derived field are dropped in favour of
    /// the derived value.
    pub fn new(
        path: &ContentPath,
        mut front_matter: FrontMatter,
        raw_body: String,
        body: String,
    ) -> Self {
        for reserved in RESERVED_FIELDS {
            if front_matter.shift_remove(reserved).is_some() {
                tracing::debug!("{}: front-matter key '{}' replaced by loader", path, reserved);
            }
        }

        Self {
            fields: front_matter,
            body,
            raw_body,
            collection: path.collection.clone(),
            slug: path.slug.clone(),
        }
    }

    /// Look up a front-matter field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `title` field, when it is a string
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// False only when `active` is explicitly `false`
    pub fn is_active(&self) -> bool {
        !matches!(self.get("active"), Some(Value::Bool(false)))
    }

    /// The `date` field, parsed
    pub fn date(&self) -> Option<DateTime<Local>> {
        self.get("date").and_then(Value::as_str).and_then(parse_date_string)
    }
}
