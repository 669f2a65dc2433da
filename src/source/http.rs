//! HTTP content source

use async_trait::async_trait;
use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;

use super::{DirectoryLister, Fetcher};
use crate::error::FetchError;

lazy_static! {
    static ref HREF_RE: Regex = Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#)
        .expect("href pattern is valid");
}

/// Reads documents from `<base_url>/<path>`
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Share an existing client (connection pool) with the caller
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Full URL of a content path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Fetcher for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DirectoryLister for HttpSource {
    async fn list(&self, dir: &str) -> Vec<String> {
        let index_path = format!("{}/", dir.trim_end_matches('/'));
        match self.fetch(&index_path).await {
            Ok(html) => parse_index_page(&html),
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", index_path, e);
                Vec::new()
            }
        }
    }
}

/// Extract file names from a directory index page.
///
/// Only relative links to files in the same directory count: parent links,
/// absolute or external URLs, sort links (`?C=N`) and sub-directories are
/// skipped. Names are percent-decoded and de-duplicated in page order.
pub fn parse_index_page(html: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for captures in HREF_RE.captures_iter(html) {
        let href = &captures[1];
        let href = href.split(['?', '#']).next().unwrap_or_default();
        let href = href.strip_prefix("./").unwrap_or(href);

        if href.is_empty()
            || href.starts_with('/')
            || href.starts_with("..")
            || href.contains(':')
            || href.contains('/')
        {
            continue;
        }

        let name = percent_decode_str(href).decode_utf8_lossy().into_owned();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
}
