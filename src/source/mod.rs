//! Content sources - where raw documents and directory listings come from
//!
//! The loader only sees the two traits below. `HttpSource` reads a site
//! served over HTTP and scrapes directory index pages for listings;
//! `LocalSource` reads a content tree on disk.

mod http;
mod local;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::{parse_index_page, HttpSource};
pub use local::LocalSource;

/// Retrieves raw document text by path (relative to the content root)
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// One attempt, no retries
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Lists the entry names visible under a directory-like path
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// Entry names in listing order; empty on any failure
    async fn list(&self, dir: &str) -> Vec<String>;
}
