//! Content module - documents, front-matter, rendering and loading

mod defaults;
mod frontmatter;
pub mod loader;
mod markdown;
mod record;

pub use defaults::DefaultContent;
pub use frontmatter::{parse_yaml_mapping, FrontMatter, ParsedDocument};
pub use loader::{Cached, ContentCache, ContentLoader, Settings};
pub use markdown::MarkdownRenderer;
pub use record::{ContentPath, ContentRecord, RESERVED_FIELDS};
